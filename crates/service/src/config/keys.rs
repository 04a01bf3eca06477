//! Key shapes understood in the configuration blob.
//!
//! - `target_select_<n>`: value is a target selected for general use
//! - `ill_avail_config_display_<context>_<n>`: value is a target enabled in `<context>`
//! - `ill_avail_config_partners_<target>`: value is the partner id of `<target>`
//! - `ill_avail_z3950_name`: display name of the service
//!
//! `<n>` is one or more ASCII digits and `<context>` is never empty. Every
//! other key is ignored.

pub const TARGET_SELECT_PREFIX: &str = "target_select_";
pub const CONTEXT_DISPLAY_PREFIX: &str = "ill_avail_config_display_";
pub const PARTNER_PREFIX: &str = "ill_avail_config_partners_";
pub const DISPLAY_NAME_KEY: &str = "ill_avail_z3950_name";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigKey<'a> {
    TargetSelect,
    ContextDisplay { context: &'a str },
    Partner { target: &'a str },
    DisplayName,
    Other,
}

impl<'a> ConfigKey<'a> {
    pub fn classify(key: &'a str) -> Self {
        if key == DISPLAY_NAME_KEY {
            return Self::DisplayName;
        }
        if let Some(rest) = key.strip_prefix(TARGET_SELECT_PREFIX) {
            return if is_index(rest) { Self::TargetSelect } else { Self::Other };
        }
        if let Some(rest) = key.strip_prefix(CONTEXT_DISPLAY_PREFIX) {
            // the context is everything up to the final `_<digits>`
            return match rest.rsplit_once('_') {
                Some((context, index)) if !context.is_empty() && is_index(index) => {
                    Self::ContextDisplay { context }
                }
                _ => Self::Other,
            };
        }
        if let Some(target) = key.strip_prefix(PARTNER_PREFIX) {
            if !target.is_empty() {
                return Self::Partner { target };
            }
        }
        Self::Other
    }
}

fn is_index(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
