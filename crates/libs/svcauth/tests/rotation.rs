use std::io::Write;
use std::sync::Arc;
use std::thread;

use svcauth::experiments::ExperimentSet;
use svcauth::{
    sign, AuthConfig, Clock, ErrorKind, HmacAuth, LoadedMethods, MethodSet, Request, ServiceAuth,
};

const NOW: u64 = 1_760_000_000;

fn hmac(name: &str, secret: &str) -> Arc<dyn ServiceAuth> {
    Arc::new(HmacAuth::new(name, secret).with_clock(Clock::Fixed(NOW)))
}

fn signed_with(method: &Arc<dyn ServiceAuth>, body: &str) -> Request {
    let mut req = Request::new(body);
    sign(method.as_ref(), &mut req).expect("sign");
    req
}

#[test]
fn rotation_accepts_old_and_new_during_overlap_then_retires_old() {
    let old = hmac("hmac-v1", "old-secret");
    let new = hmac("hmac-v2", "new-secret");
    let loaded = LoadedMethods::new(MethodSet::new(vec![old.clone()]).expect("set"));

    let from_old = signed_with(&old, "GET /a");
    let from_new = signed_with(&new, "GET /b");
    assert_eq!(loaded.verify(&from_old), Ok(true));
    let err = loaded.verify(&from_new).expect_err("hmac-v2 not loaded yet");
    assert_eq!(err.kind(), ErrorKind::UnknownMethod);

    loaded.replace(MethodSet::new(vec![old.clone(), new.clone()]).expect("set"));
    assert_eq!(loaded.verify(&from_old), Ok(true));
    assert_eq!(loaded.verify(&from_new), Ok(true));

    loaded.replace(MethodSet::new(vec![new]).expect("set"));
    let err = loaded.verify(&from_old).expect_err("hmac-v1 retired");
    assert_eq!(err.kind(), ErrorKind::UnknownMethod);
    assert_eq!(loaded.verify(&from_new), Ok(true));
}

#[test]
fn concurrent_verifiers_see_whole_sets_across_swaps() {
    let a = hmac("hmac-a", "a");
    let b = hmac("hmac-b", "b");
    let both = MethodSet::new(vec![a.clone(), b.clone()]).expect("set");
    let loaded = Arc::new(LoadedMethods::new(both.clone()));
    let from_a = Arc::new(signed_with(&a, "GET /a"));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let loaded = Arc::clone(&loaded);
            let req = Arc::clone(&from_a);
            thread::spawn(move || {
                for _ in 0..500 {
                    let snapshot = loaded.snapshot();
                    let names = snapshot.names();
                    assert!(
                        names == vec!["hmac-a", "hmac-b"] || names == vec!["hmac-b", "hmac-a"],
                        "partial set observed: {names:?}"
                    );
                    assert_eq!(snapshot.verify(req.as_ref()), Ok(true));
                }
            })
        })
        .collect();

    let reordered = MethodSet::new(vec![b, a]).expect("set");
    for round in 0..200 {
        let next = if round % 2 == 0 {
            reordered.clone()
        } else {
            both.clone()
        };
        loaded.replace(next);
    }

    for reader in readers {
        reader.join().expect("reader thread");
    }
}

#[test]
fn config_file_drives_signer_and_experiment_gated_methods() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        r#"
sign_with = ["ed25519-v1", "hmac-v1"]

[[methods]]
kind = "hmac"
name = "hmac-v1"
secret = "s3cr3t"
max_skew_secs = 120

[[methods]]
kind = "ed25519"
signing_key = "{seed}"
requires_experiment = "v2"
"#,
        seed = "07".repeat(32)
    )
    .expect("write config");

    let config = AuthConfig::from_path(file.path()).expect("load config");

    let stable = ExperimentSet::from_sources(&["metrics"], None, &[]).expect("experiments");
    let setup = config.build(&stable).expect("build without v2");
    assert_eq!(setup.methods.names(), vec!["hmac-v1"]);
    let signer = setup.signer.expect("signer");
    assert_eq!(signer.method(), "hmac-v1");

    let mut req = Request::new("GET /orders/42");
    sign(signer.as_ref(), &mut req).expect("sign");
    assert_eq!(setup.methods.verify(&req), Ok(true));

    let preview = ExperimentSet::from_sources(&["metrics"], Some("v2"), &[]).expect("experiments");
    let setup = config.build(&preview).expect("build with v2");
    assert_eq!(setup.methods.names(), vec!["hmac-v1", "ed25519-v1"]);
    let signer = setup.signer.expect("signer");
    assert_eq!(signer.method(), "ed25519-v1");

    // A receiver that has not enabled v2 yet reports rollout skew.
    let mut req = Request::new("GET /orders/42");
    sign(signer.as_ref(), &mut req).expect("sign");
    let receiver = config.build(&stable).expect("build").methods;
    let err = receiver.verify(&req).expect_err("v2 method not loaded");
    assert_eq!(err.kind(), ErrorKind::UnknownMethod);
}

#[test]
fn missing_config_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = AuthConfig::from_path(dir.path().join("absent.toml")).expect_err("missing");
    assert!(matches!(err, svcauth::ConfigError::Io(_)));
}
