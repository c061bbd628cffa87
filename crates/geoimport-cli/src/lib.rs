//! geoimport-cli
//! =============
//!
//! Command-line wrapper around the `geoimport-core` GeoNames import
//! pipeline.
//!
//! This crate primarily provides a binary (`geoimport`). The library target
//! only exists so docs.rs renders this overview.
//!
//! Quick start
//! -----------
//!
//! ```text
//! geoimport import --data-dir ./data --force
//! geoimport import --import city,alt_name --locales en,de,und
//! geoimport import --plugin postal_code_ca --postal-countries CA
//! geoimport stats
//! ```
//!
//! The store is kept as a snapshot file (`--store`, default
//! `geoimport.bin.gz`); every run loads it, upserts into it and saves it.
//!
//! Without `--fetch` the remote side is unknown, so existing local files
//! are assumed current and only `--force` re-imports them.
#![cfg_attr(docsrs, feature(doc_cfg))]
