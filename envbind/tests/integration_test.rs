//! Integration tests

use envbind::{
    check_disallowed, gather, must_process, process, usage_to, BoxError, Decode, EnvError,
    Format, Options, Specification,
};
use serial_test::serial;
use std::collections::HashMap;
use std::env;
use std::io::Write;
use std::net::Ipv4Addr;
use std::time::Duration;
use tempfile::NamedTempFile;

fn clear(names: &[&str]) {
    for name in names {
        env::remove_var(name);
    }
}

#[derive(Debug, Default, Specification)]
struct Server {
    port: u16,
    host: String,
}

#[derive(Debug, Default, Specification)]
struct Credentials {
    #[env(split_words)]
    api_key: String,

    #[env(split_words)]
    #[allow(non_snake_case)]
    APIKey: String,

    #[env(split_words)]
    #[allow(non_snake_case)]
    DBHost: String,
}

#[derive(Debug, Default, Specification)]
struct Required {
    #[env(default = 1)]
    first: u8,

    #[env(required)]
    token: String,

    #[env(default = 3)]
    last: u8,
}

#[derive(Debug, Default, Specification)]
struct Timeouts {
    #[env(default = "5s")]
    read: Duration,

    #[env(default = "1h30m")]
    idle: Duration,
}

#[derive(Debug, Default, Specification)]
struct Secrets {
    foo: String,

    #[env(file = false)]
    plain: String,
}

#[derive(Debug, Default, Specification)]
struct Collections {
    tags: Vec<String>,
    ports: Vec<u16>,
    weights: HashMap<String, i32>,
    raw: Vec<u8>,
}

#[derive(Debug, Default, Specification)]
struct Database {
    host: String,
    #[env(default = 5432)]
    port: u16,
}

#[derive(Debug, Default, Specification)]
struct Logging {
    level: String,
}

#[derive(Debug, Default, Specification)]
struct Service {
    name: String,
    db: Database,
    #[env(flatten)]
    logging: Logging,
    replica: Option<Database>,
    #[env(name = "cache")]
    cache: Option<Box<Database>>,
    retries: Option<u32>,
    #[env(ignored)]
    runtime_state: String,
}

#[derive(Debug, Default, PartialEq)]
struct Level(i32);

impl Decode for Level {
    fn decode(&mut self, value: &str) -> Result<(), BoxError> {
        self.0 = match value {
            "low" => 1,
            "high" => 9,
            other => return Err(format!("unknown level {other}").into()),
        };
        Ok(())
    }

    fn description() -> String {
        "low or high".to_string()
    }
}

#[derive(Debug, Default, PartialEq)]
struct Token(Vec<u8>);

impl TryFrom<Vec<u8>> for Token {
    type Error = String;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        if bytes.len() < 4 {
            return Err("token too short".to_string());
        }
        Ok(Self(bytes))
    }
}

#[derive(Debug, Default, Specification)]
struct Custom {
    level: Level,

    #[env(deserializer = "serde_json::from_str")]
    labels: Vec<String>,

    #[env(deserializer = "serde_json::from_str")]
    limits: Option<HashMap<String, u32>>,

    #[env(from_str)]
    gateway: Option<Ipv4Addr>,

    #[env(from_bytes)]
    token: Token,
}

#[derive(Debug, Default, Specification)]
#[env(prefix = "it_struct")]
struct Prefixed {
    #[env(default = "localhost")]
    host: String,
    workers: usize,
}

#[test]
#[serial]
fn test_plain_identifier_keys() {
    env::set_var("PORT", "8080");
    env::set_var("HOST", "example.com");

    let mut server = Server::default();
    process(&mut server, &Options::new()).unwrap();
    assert_eq!(server.port, 8080);
    assert_eq!(server.host, "example.com");

    clear(&["PORT", "HOST"]);
}

#[test]
#[serial]
fn test_prefixed_keys() {
    env::set_var("X_PORT", "8080");
    env::remove_var("X_HOST");

    let mut server = Server::default();
    process(&mut server, &Options::new().with_prefix("x")).unwrap();
    assert_eq!(server.port, 8080);
    assert_eq!(server.host, "");

    clear(&["X_PORT"]);
}

#[test]
#[serial]
fn test_split_words_keys() {
    let mut creds = Credentials::default();
    let keys: Vec<String> = gather(&mut creds, &Options::new())
        .unwrap()
        .iter()
        .map(|var| var.key().to_string())
        .collect();
    assert_eq!(keys, ["API_KEY", "API_KEY", "DB_HOST"]);

    env::set_var("IT_SPLIT_DB_HOST", "db.local");
    let mut creds = Credentials::default();
    process(&mut creds, &Options::new().with_prefix("it_split")).unwrap();
    assert_eq!(creds.DBHost, "db.local");

    clear(&["IT_SPLIT_DB_HOST"]);
}

#[test]
#[serial]
fn test_required_key_missing_stops_processing() {
    clear(&["IT_REQ_FIRST", "IT_REQ_TOKEN", "IT_REQ_TOKEN_FILE", "IT_REQ_LAST"]);

    let mut spec = Required::default();
    let err = process(&mut spec, &Options::new().with_prefix("it_req")).unwrap_err();

    assert!(matches!(&err, EnvError::Missing { key } if key == "IT_REQ_TOKEN"));
    assert_eq!(err.to_string(), "required key IT_REQ_TOKEN missing value");
    assert_eq!(spec.first, 1, "fields before the failure are written");
    assert_eq!(spec.last, 0, "fields after the failure are not attempted");
}

#[test]
#[serial]
fn test_required_key_satisfied() {
    env::set_var("IT_REQ_TOKEN", "abc");

    let mut spec = Required::default();
    process(&mut spec, &Options::new().with_prefix("it_req")).unwrap();
    assert_eq!(spec.token, "abc");
    assert_eq!(spec.last, 3);

    clear(&["IT_REQ_TOKEN"]);
}

#[test]
#[serial]
fn test_duration_defaults() {
    clear(&["IT_DUR_READ", "IT_DUR_IDLE"]);

    let mut spec = Timeouts::default();
    process(&mut spec, &Options::new().with_prefix("it_dur")).unwrap();
    assert_eq!(spec.read, Duration::from_secs(5));
    assert_eq!(spec.idle, Duration::from_secs(5_400));

    env::set_var("IT_DUR_READ", " 250ms ");
    process(&mut spec, &Options::new().with_prefix("it_dur")).unwrap();
    assert_eq!(spec.read, Duration::from_millis(250));

    clear(&["IT_DUR_READ"]);
}

#[test]
#[serial]
fn test_file_indirection() {
    let mut secret = NamedTempFile::new().unwrap();
    writeln!(secret, "secret").unwrap();

    clear(&["FOO", "PLAIN"]);
    env::set_var("FOO_FILE", secret.path());
    env::set_var("PLAIN_FILE", secret.path());

    let mut spec = Secrets::default();
    process(&mut spec, &Options::new()).unwrap();
    assert_eq!(spec.foo, "secret");
    assert_eq!(spec.plain, "", "file = false disables indirection");

    clear(&["FOO_FILE", "PLAIN_FILE"]);
}

#[test]
#[serial]
fn test_file_indirection_disabled_by_options() {
    let mut secret = NamedTempFile::new().unwrap();
    write!(secret, "secret").unwrap();

    clear(&["FOO"]);
    env::set_var("FOO_FILE", secret.path());

    let mut spec = Secrets::default();
    process(&mut spec, &Options::new().without_default_loading_from_files()).unwrap();
    assert_eq!(spec.foo, "");

    clear(&["FOO_FILE"]);
}

#[test]
#[serial]
fn test_unreadable_file_aborts() {
    clear(&["FOO"]);
    env::set_var("FOO_FILE", "/nonexistent/envbind/secret");

    let mut spec = Secrets::default();
    let err = process(&mut spec, &Options::new()).unwrap_err();
    match err {
        EnvError::FileRead { name, path, .. } => {
            assert_eq!(name, "FOO_FILE");
            assert_eq!(path, "/nonexistent/envbind/secret");
        }
        other => panic!("expected FileRead, got {other:?}"),
    }

    clear(&["FOO_FILE"]);
}

#[test]
#[serial]
fn test_sequences_and_mappings() {
    env::set_var("IT_COLL_TAGS", "a,b,c");
    env::set_var("IT_COLL_PORTS", "80,443");
    env::set_var("IT_COLL_WEIGHTS", "a:1,b:2");
    env::set_var("IT_COLL_RAW", "x,y");

    let mut spec = Collections::default();
    process(&mut spec, &Options::new().with_prefix("it_coll")).unwrap();
    assert_eq!(spec.tags, ["a", "b", "c"]);
    assert_eq!(spec.ports, [80, 443]);
    assert_eq!(spec.weights.len(), 2);
    assert_eq!(spec.weights["a"], 1);
    assert_eq!(spec.weights["b"], 2);
    assert_eq!(spec.raw, b"x,y");

    env::set_var("IT_COLL_TAGS", "");
    env::set_var("IT_COLL_WEIGHTS", "   ");
    process(&mut spec, &Options::new().with_prefix("it_coll")).unwrap();
    assert!(spec.tags.is_empty());
    assert!(spec.weights.is_empty());

    clear(&["IT_COLL_TAGS", "IT_COLL_PORTS", "IT_COLL_WEIGHTS", "IT_COLL_RAW"]);
}

#[test]
#[serial]
fn test_malformed_map_item() {
    for bad in ["a:1:2", "a"] {
        env::set_var("IT_COLL_WEIGHTS", bad);

        let mut spec = Collections::default();
        let err = process(&mut spec, &Options::new().with_prefix("it_coll")).unwrap_err();
        assert!(
            err.to_string().contains("invalid map item"),
            "{bad:?}: {err}"
        );
    }

    clear(&["IT_COLL_WEIGHTS"]);
}

#[test]
#[serial]
fn test_parse_error_context() {
    env::set_var("IT_PARSE_PORT", "eighty");

    let mut server = Server::default();
    let err = process(&mut server, &Options::new().with_prefix("it_parse")).unwrap_err();
    match &err {
        EnvError::Parse {
            key,
            field,
            type_name,
            value,
            ..
        } => {
            assert_eq!(key, "IT_PARSE_PORT");
            assert_eq!(*field, "port");
            assert_eq!(*type_name, "u16");
            assert_eq!(value, "eighty");
        }
        other => panic!("expected Parse, got {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "assigning IT_PARSE_PORT to port: converting 'eighty' to type u16: invalid syntax for integer: \"eighty\""
    );

    env::set_var("IT_PARSE_PORT", "70000");
    let err = process(&mut server, &Options::new().with_prefix("it_parse")).unwrap_err();
    assert!(err.to_string().contains("out of range"), "{err}");

    clear(&["IT_PARSE_PORT"]);
}

#[test]
#[serial]
fn test_nested_prefixes() {
    env::set_var("IT_SVC_NAME", "api");
    env::set_var("IT_SVC_DB_HOST", "db.local");
    env::set_var("IT_SVC_LEVEL", "debug");
    env::set_var("IT_SVC_REPLICA_HOST", "replica.local");
    env::set_var("IT_SVC_CACHE_PORT", "6379");
    env::set_var("IT_SVC_RUNTIME_STATE", "ignored");
    env::remove_var("IT_SVC_RETRIES");

    let mut svc = Service::default();
    process(&mut svc, &Options::new().with_prefix("it_svc")).unwrap();

    assert_eq!(svc.name, "api");
    assert_eq!(svc.db.host, "db.local");
    assert_eq!(svc.db.port, 5432);
    assert_eq!(svc.logging.level, "debug", "flattened fields keep the parent prefix");
    let replica = svc.replica.as_ref().unwrap();
    assert_eq!(replica.host, "replica.local");
    assert_eq!(svc.cache.as_ref().unwrap().port, 6379);
    assert_eq!(svc.retries, None, "optional leaves stay unset without a value");
    assert_eq!(svc.runtime_state, "");

    env::set_var("IT_SVC_RETRIES", "3");
    process(&mut svc, &Options::new().with_prefix("it_svc")).unwrap();
    assert_eq!(svc.retries, Some(3));

    clear(&[
        "IT_SVC_NAME",
        "IT_SVC_DB_HOST",
        "IT_SVC_LEVEL",
        "IT_SVC_REPLICA_HOST",
        "IT_SVC_CACHE_PORT",
        "IT_SVC_RUNTIME_STATE",
        "IT_SVC_RETRIES",
    ]);
}

#[test]
#[serial]
fn test_nested_fields_contribute_only_children() {
    let mut svc = Service::default();
    let keys: Vec<String> = gather(&mut svc, &Options::new().with_prefix("svc"))
        .unwrap()
        .iter()
        .map(|var| var.key().to_string())
        .collect();

    assert_eq!(
        keys,
        [
            "SVC_NAME",
            "SVC_DB_HOST",
            "SVC_DB_PORT",
            "SVC_LEVEL",
            "SVC_REPLICA_HOST",
            "SVC_REPLICA_PORT",
            "SVC_CACHE_HOST",
            "SVC_CACHE_PORT",
            "SVC_RETRIES",
        ]
    );
}

#[test]
#[serial]
fn test_custom_decoding_wins() {
    let mut token_file = NamedTempFile::new().unwrap();
    write!(token_file, "  abcdef  ").unwrap();

    env::set_var("IT_CUSTOM_LEVEL", "high");
    env::set_var("IT_CUSTOM_LABELS", r#"["blue", "green"]"#);
    env::set_var("IT_CUSTOM_LIMITS", r#"{"cpu": 2}"#);
    env::set_var("IT_CUSTOM_GATEWAY", "10.0.0.1");
    env::remove_var("IT_CUSTOM_TOKEN");
    env::set_var("IT_CUSTOM_TOKEN_FILE", token_file.path());

    let mut spec = Custom::default();
    process(&mut spec, &Options::new().with_prefix("it_custom")).unwrap();

    assert_eq!(spec.level, Level(9));
    assert_eq!(spec.labels, ["blue", "green"]);
    assert_eq!(spec.limits.as_ref().unwrap()["cpu"], 2);
    assert_eq!(spec.gateway, Some(Ipv4Addr::new(10, 0, 0, 1)));
    assert_eq!(spec.token, Token(b"abcdef".to_vec()));

    clear(&[
        "IT_CUSTOM_LEVEL",
        "IT_CUSTOM_LABELS",
        "IT_CUSTOM_LIMITS",
        "IT_CUSTOM_GATEWAY",
        "IT_CUSTOM_TOKEN_FILE",
    ]);
}

#[test]
#[serial]
fn test_custom_decoding_errors_are_wrapped() {
    env::set_var("IT_CUSTOM_LEVEL", "7");

    let mut spec = Custom::default();
    let err = process(&mut spec, &Options::new().with_prefix("it_custom")).unwrap_err();
    assert!(matches!(&err, EnvError::Parse { field, .. } if *field == "level"));
    assert!(err.to_string().ends_with("unknown level 7"), "{err}");

    env::remove_var("IT_CUSTOM_LEVEL");
    env::set_var("IT_CUSTOM_LABELS", "not json");
    let err = process(&mut spec, &Options::new().with_prefix("it_custom")).unwrap_err();
    assert!(matches!(&err, EnvError::Parse { key, .. } if key == "IT_CUSTOM_LABELS"));

    clear(&["IT_CUSTOM_LABELS"]);
}

#[test]
#[serial]
fn test_alternate_key_for_named_field() {
    clear(&["IT_ALT_CACHE_HOST", "IT_ALT_CACHE_PORT", "CACHE_HOST"]);

    #[derive(Debug, Default, Specification)]
    struct Alt {
        #[env(name = "cache_host")]
        host: String,
    }

    env::set_var("CACHE_HOST", "bare.local");
    let mut spec = Alt::default();
    process(&mut spec, &Options::new().with_prefix("it_alt")).unwrap();
    assert_eq!(spec.host, "bare.local");

    env::set_var("IT_ALT_CACHE_HOST", "prefixed.local");
    process(&mut spec, &Options::new().with_prefix("it_alt")).unwrap();
    assert_eq!(spec.host, "prefixed.local");

    clear(&["IT_ALT_CACHE_HOST", "CACHE_HOST"]);
}

#[test]
#[serial]
fn test_trim_spaces_toggle() {
    env::set_var("IT_TRIM_HOST", "  spaced  ");
    env::remove_var("IT_TRIM_PORT");

    let mut server = Server::default();
    process(&mut server, &Options::new().with_prefix("it_trim")).unwrap();
    assert_eq!(server.host, "spaced");

    process(
        &mut server,
        &Options::new().with_prefix("it_trim").without_trim_spaces(),
    )
    .unwrap();
    assert_eq!(server.host, "  spaced  ");

    clear(&["IT_TRIM_HOST"]);
}

#[test]
#[serial]
fn test_nested_walk_keeps_trim_setting() {
    env::set_var("IT_NTRIM_DB_HOST", " db ");

    let mut svc = Service::default();
    process(
        &mut svc,
        &Options::new().with_prefix("it_ntrim").without_trim_spaces(),
    )
    .unwrap();
    assert_eq!(svc.db.host, " db ");

    clear(&["IT_NTRIM_DB_HOST"]);
}

#[test]
#[serial]
fn test_check_disallowed() {
    clear(&["APP_HOST", "APP_PORT_FILE"]);
    env::set_var("APP_PORT", "1");

    #[derive(Debug, Default, Specification)]
    struct App {
        port: u16,
    }

    let opts = Options::new().with_prefix("app");
    check_disallowed(&mut App::default(), &opts).unwrap();

    env::set_var("APP_PORT_FILE", "/run/secrets/port");
    let err = check_disallowed(&mut App::default(), &opts).unwrap_err();
    assert!(matches!(&err, EnvError::UnknownVariable { name } if name == "APP_PORT_FILE"));

    let lenient = opts.clone().with_file_variables_allowed();
    check_disallowed(&mut App::default(), &lenient).unwrap();
    env::remove_var("APP_PORT_FILE");

    env::set_var("APP_HOST", "x");
    let err = check_disallowed(&mut App::default(), &opts).unwrap_err();
    assert!(matches!(&err, EnvError::UnknownVariable { name } if name == "APP_HOST"));
    assert_eq!(err.to_string(), "unknown environment variable APP_HOST");

    clear(&["APP_HOST", "APP_PORT"]);
}

#[test]
#[serial]
fn test_nested_specification_is_not_a_leaf_value() {
    #[derive(Debug, Default, Specification)]
    struct Pools {
        pools: Vec<Database>,
    }

    env::set_var("IT_POOLS_POOLS", "a,b");
    let mut spec = Pools::default();
    let err = process(&mut spec, &Options::new().with_prefix("it_pools")).unwrap_err();
    assert!(
        err.to_string().contains("specification must be a struct"),
        "{err}"
    );

    clear(&["IT_POOLS_POOLS"]);
}

#[test]
#[serial]
#[should_panic(expected = "required key IT_MUST_TOKEN missing value")]
fn test_must_process_panics() {
    clear(&["IT_MUST_TOKEN", "IT_MUST_TOKEN_FILE"]);

    let mut spec = Required::default();
    must_process(&mut spec, &Options::new().with_prefix("it_must"));
}

#[test]
#[serial]
fn test_from_env_uses_struct_prefix() {
    env::set_var("IT_STRUCT_WORKERS", "4");
    env::remove_var("IT_STRUCT_HOST");

    let config = Prefixed::from_env().unwrap();
    assert_eq!(config.host, "localhost");
    assert_eq!(config.workers, 4);

    env::set_var("IT_STRUCT_WORKERS", "-4");
    let err = Prefixed::from_env().unwrap_err();
    assert!(err.to_string().contains("IT_STRUCT_WORKERS"), "{err}");

    clear(&["IT_STRUCT_WORKERS"]);
}

#[test]
#[serial]
fn test_usage_rendering() {
    #[derive(Debug, Default, Specification)]
    struct Documented {
        /// Port to listen on
        #[env(default = 8080)]
        port: u16,

        #[env(required, desc = "Signing secret")]
        secret: String,

        timeouts: Timeouts,
    }

    let opts = Options::new().with_prefix("doc");
    let format = Format::Template("{key}|{type}|{default}|{required}|{description}\n".to_string());
    let mut out = Vec::new();
    usage_to(&mut Documented::default(), &opts, &mut out, &format).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "DOC_PORT|Unsigned Integer|8080||Port to listen on\n\
         DOC_SECRET|String||true|Signing secret\n\
         DOC_TIMEOUTS_READ|Duration|5s||\n\
         DOC_TIMEOUTS_IDLE|Duration|1h30m||\n"
    );

    let mut out = Vec::new();
    usage_to(&mut Documented::default(), &opts, &mut out, &Format::Table).unwrap();
    let table = String::from_utf8(out).unwrap();
    assert!(table.starts_with(envbind::USAGE_HEADER));
    assert!(table.contains("DOC_SECRET"));

    let mut out = Vec::new();
    usage_to(&mut Documented::default(), &opts, &mut out, &Format::Json).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json[1]["key"], "DOC_SECRET");
    assert_eq!(json[1]["required"], true);
    assert_eq!(json[0]["default"], "8080");

    let bad = Format::Template("{nope}".to_string());
    let err = usage_to(&mut Documented::default(), &opts, &mut Vec::new(), &bad).unwrap_err();
    assert!(matches!(err, EnvError::Template { .. }));
}
