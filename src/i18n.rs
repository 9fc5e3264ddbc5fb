use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use yuuka::derive_struct;

// Include translation TOML at compile time
const EN_US_TOML: &str = include_str!("../res/i18n/en_us.toml");
const ZH_CHS_TOML: &str = include_str!("../res/i18n/zh_chs.toml");

derive_struct! {
    #[derive(PartialEq, Serialize, Deserialize)]
    pub Lang {
        title: String = "title".to_string(),
        info_line: String = "info_line".to_string(),
        ports_title: String = "ports_title".to_string(),
        no_ports: String = "no_ports".to_string(),
        updated_at: String = "updated_at".to_string(),
        device_count: String = "device_count".to_string(),
        status_monitoring: String = "status_monitoring".to_string(),
        status_idle: String = "status_idle".to_string(),
        start_monitoring: String = "start_monitoring".to_string(),
        stop_monitoring: String = "stop_monitoring".to_string(),
        open_config: String = "open_config".to_string(),
        // configuration form
        config_title: String = "config_title".to_string(),
        config_params: String = "config_params".to_string(),
        config_program: String = "config_program".to_string(),
        label_baud: String = "label_baud".to_string(),
        label_data_bits: String = "label_data_bits".to_string(),
        label_stop_bits: String = "label_stop_bits".to_string(),
        label_parity: String = "label_parity".to_string(),
        label_flow_control: String = "label_flow_control".to_string(),
        label_program_path: String = "label_program_path".to_string(),
        save: String = "save".to_string(),
        cancel: String = "cancel".to_string(),
        // popups
        notice_title: String = "notice_title".to_string(),
        config_saved: String = "config_saved".to_string(),
        config_save_failed: String = "config_save_failed".to_string(),
        error_title: String = "error_title".to_string(),
        program_not_found: String = "program_not_found".to_string(),
        launch_failed: String = "launch_failed".to_string(),
        monitor_failed: String = "monitor_failed".to_string(),
        // bottom hints
        hint_main: String = "hint_main".to_string(),
        hint_config: String = "hint_config".to_string(),
        hint_popup: String = "hint_popup".to_string(),
    }
}

static LANG_SELECTED: OnceCell<Lang> = OnceCell::new();
static LOCALE: OnceCell<String> = OnceCell::new();

fn parse_toml_to_lang(content: &str) -> Lang {
    match toml::from_str::<Lang>(content) {
        Ok(l) => l,
        Err(e) => {
            log::warn!(
                "i18n: failed to parse toml: {}\ncontent preview: {}",
                e,
                &content.chars().take(200).collect::<String>()
            );
            // Fallback: return the default Lang (keys as values)
            Lang::default()
        }
    }
}

/// Return a reference to the currently selected `Lang`.
/// Callers can access fields directly, e.g. `i18n::lang().title`.
pub fn lang() -> &'static Lang {
    LANG_SELECTED.get_or_init(|| parse_toml_to_lang(EN_US_TOML))
}

/// Replace the `{key}` placeholder of a translated template.
pub fn fill(template: &str, key: &str, value: impl Display) -> String {
    template.replace(&format!("{{{key}}}"), &value.to_string())
}

/// Pick a locale key from preference strings such as `zh_CN.UTF-8`.
fn choose_locale(prefs: &[String]) -> &'static str {
    for p in prefs {
        if p.contains("zh") {
            return "zh_chs";
        }
        if p.contains("en") {
            return "en_us";
        }
    }
    "en_us"
}

pub fn init_i18n() {
    // Detect preferred languages from env vars
    let mut prefs: Vec<String> = Vec::new();
    if let Ok(v) = std::env::var("LANGUAGE") {
        prefs.extend(v.split(':').map(|s| s.to_lowercase()));
    }
    if let Ok(v) = std::env::var("LC_ALL") {
        prefs.push(v.to_lowercase());
    }
    if let Ok(v) = std::env::var("LANG") {
        prefs.push(v.to_lowercase());
    }
    // Windows common env
    if let Ok(v) = std::env::var("USERLANGUAGE") {
        prefs.push(v.to_lowercase());
    }

    let locale = choose_locale(&prefs);
    let selected = match locale {
        "zh_chs" => parse_toml_to_lang(ZH_CHS_TOML),
        _ => parse_toml_to_lang(EN_US_TOML),
    };

    LOCALE.set(locale.to_string()).ok();
    LANG_SELECTED.set(selected).ok();

    let user = whoami::username();
    log::info!(
        "i18n: user={} locale={}",
        user,
        LOCALE.get().map(|s| s.as_str()).unwrap_or("-")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_tables_parse_completely() {
        let defaults = Lang::default();
        for content in [EN_US_TOML, ZH_CHS_TOML] {
            let lang = parse_toml_to_lang(content);
            assert_ne!(lang.title, defaults.title);
            assert_ne!(lang.hint_popup, defaults.hint_popup);
            assert!(lang.device_count.contains("{count}"));
        }
    }

    #[test]
    fn locale_preferences() {
        assert_eq!(choose_locale(&["zh_cn.utf-8".to_string()]), "zh_chs");
        assert_eq!(choose_locale(&["en_us.utf-8".to_string()]), "en_us");
        assert_eq!(choose_locale(&["c".to_string()]), "en_us");
        assert_eq!(choose_locale(&[]), "en_us");
    }

    #[test]
    fn fills_placeholders() {
        assert_eq!(fill("Detected {count} devices", "count", 3), "Detected 3 devices");
        assert_eq!(fill("no placeholder", "count", 3), "no placeholder");
    }
}
