use std::collections::HashMap;

use handyhub::config::{AppConfig, ConfigError, Environment};

fn resolve(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    AppConfig::from_vars(|name| vars.get(name).cloned())
}

#[test]
fn development_defaults() {
    let config = resolve(&[]).unwrap();

    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.port, 5000);
    assert_eq!(config.hash_cost, 10);
    assert_eq!(config.base_url.as_str(), "http://localhost:5000/");
    assert!(config.database_url.is_none());
    assert!(config.mail.is_none());
}

#[test]
fn hash_cost_outside_bcrypt_range_is_rejected() {
    for cost in ["0", "3", "32"] {
        let result = resolve(&[("HASH_COST", cost)]);

        match result {
            Err(ConfigError::Invalid { name, value }) => {
                assert_eq!(name, "HASH_COST");
                assert_eq!(value, cost);
            }
            other => panic!("cost {cost} accepted: {other:?}"),
        }
    }

    assert_eq!(resolve(&[("HASH_COST", "4")]).unwrap().hash_cost, 4);
    assert_eq!(resolve(&[("HASH_COST", "31")]).unwrap().hash_cost, 31);
}

#[test]
fn unparsable_values_are_invalid() {
    assert!(matches!(
        resolve(&[("HASH_COST", "ten")]),
        Err(ConfigError::Invalid { name: "HASH_COST", .. })
    ));
    assert!(matches!(
        resolve(&[("PORT", "70000")]),
        Err(ConfigError::Invalid { name: "PORT", .. })
    ));
    assert!(matches!(
        resolve(&[("BASE_URL", "not a url")]),
        Err(ConfigError::Invalid { name: "BASE_URL", .. })
    ));
}

#[test]
fn production_requires_base_url_and_mail_settings() {
    assert!(matches!(
        resolve(&[("APP_ENV", "production")]),
        Err(ConfigError::Missing("BASE_URL"))
    ));
    assert!(matches!(
        resolve(&[("APP_ENV", "production"), ("BASE_URL", "https://handyhub.example")]),
        Err(ConfigError::Missing("MAIL_API_URL"))
    ));

    let config = resolve(&[
        ("APP_ENV", "Production"),
        ("BASE_URL", "https://handyhub.example/api"),
        ("MAIL_API_URL", "https://mail.example/send"),
        ("MAIL_API_KEY", "key"),
        ("SENDER_EMAIL", "no-reply@handyhub.example"),
    ])
    .unwrap();
    assert_eq!(config.environment, Environment::Production);
    assert_eq!(config.base_url.path(), "/api");
    let mail = config.mail.unwrap();
    assert_eq!(mail.api_key, "key");
    assert_eq!(mail.sender, "no-reply@handyhub.example");
}
