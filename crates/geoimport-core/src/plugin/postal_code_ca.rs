// crates/geoimport-core/src/plugin/postal_code_ca.rs
//! Canadian postal rows carry province abbreviations in the admin1 column,
//! while admin1CodesASCII.txt keys Canadian provinces numerically.

use crate::hooks::{HookName, HookResult, Plugin};
use crate::model::raw::postal_code as col;
use crate::model::Fields;
use once_cell::sync::Lazy;
use std::collections::HashMap;

static CA_PROVINCE_CODES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("AB", "01"),
        ("BC", "02"),
        ("MB", "03"),
        ("NB", "04"),
        ("NL", "05"),
        ("NS", "07"),
        ("ON", "08"),
        ("PE", "09"),
        ("QC", "10"),
        ("SK", "11"),
        ("YT", "12"),
        ("NT", "13"),
        ("NU", "14"),
    ])
});

/// Rewrites the admin1 code of `CA` postal rows before parsing.
#[derive(Debug, Default)]
pub struct PostalCodeCa;

impl PostalCodeCa {
    pub const NAME: &'static str = "postal_code_ca";
}

impl Plugin for PostalCodeCa {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn hooks(&self) -> &[HookName] {
        &[HookName::PostalCodePre]
    }

    fn pre(&self, _hook: HookName, fields: &mut Fields) -> HookResult {
        if fields.get(col::COUNTRY_CODE) != "CA" {
            return Ok(());
        }
        if let Some(code) = CA_PROVINCE_CODES.get(fields.get(col::ADMIN1_CODE)) {
            fields.set(col::ADMIN1_CODE, *code);
        }
        Ok(())
    }
}
