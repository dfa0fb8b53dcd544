//! Remote routing of the non-handle operations and session pooling.

mod common;

use std::sync::Arc;
use std::thread;

use common::{Harness, MemorySecretStore, NoTerminalPrompt, ScriptedPrompt};
use oxdav_core::{
    CredentialError, CredentialResolver, DavError, EnvCredentials, OpenMode, OpenOptions,
    RemoteError,
};
use secrecy::SecretString;

// =============================================================================
// Directory, existence and delete operations
// =============================================================================

#[test]
fn test_mkdir_and_rmdir_remote() {
    let h = Harness::new();
    let dir = "https://dav.example.com/projects/";

    h.dav.mkdir(dir).unwrap();
    assert!(h.server.has_collection(dir));
    assert!(h.dav.exists(dir).unwrap());

    h.dav.rmdir(dir).unwrap();
    assert!(!h.server.has_collection(dir));
    assert_eq!(h.server.count("MKCOL"), 1);
    assert_eq!(h.server.count("DELETE"), 1);
}

#[test]
fn test_exists_remote() {
    let h = Harness::new();
    h.server.insert("https://dav.example.com/here.txt", b"1");

    assert!(h.dav.exists("https://dav.example.com/here.txt").unwrap());
    assert!(!h.dav.exists("https://dav.example.com/gone.txt").unwrap());
}

#[test]
fn test_delete_remote() {
    let h = Harness::new();
    h.server.insert("https://dav.example.com/a.txt", b"a");

    h.dav.delete("https://dav.example.com/a.txt").unwrap();
    assert!(h.server.content("https://dav.example.com/a.txt").is_none());

    let err = h.dav.delete("https://dav.example.com/a.txt").unwrap_err();
    assert!(matches!(err, DavError::Remote(RemoteError::NotFound(_))));
}

#[test]
fn test_delete_all_continues_past_failures() {
    let h = Harness::new();
    let targets = [
        "https://dav.example.com/1.txt",
        "https://dav.example.com/2.txt",
        "https://dav.example.com/3.txt",
    ];
    for t in &targets {
        h.server.insert(t, b"x");
    }
    h.server.fail_on(targets[1]);

    let err = h.dav.delete_all(targets).unwrap_err();

    let DavError::Delete(errors) = err else {
        panic!("expected batch delete error, got {err:?}");
    };
    assert_eq!(errors.attempted, 3);
    assert_eq!(errors.failed_targets().collect::<Vec<_>>(), [targets[1]]);
    assert!(h.server.content(targets[0]).is_none());
    assert!(h.server.content(targets[1]).is_some());
    assert!(h.server.content(targets[2]).is_none());

    let deletes: Vec<_> = h
        .server
        .calls()
        .into_iter()
        .filter(|c| c.method == "DELETE")
        .map(|c| c.url)
        .collect();
    assert_eq!(deletes, targets);
}

#[test]
fn test_delete_all_reports_every_failure() {
    let h = Harness::new();
    let err = h
        .dav
        .delete_all(vec![
            "https://dav.example.com/missing-1".to_string(),
            "https://dav.example.com/missing-2".to_string(),
        ])
        .unwrap_err();

    let DavError::Delete(errors) = err else {
        panic!("expected batch delete error");
    };
    assert_eq!(errors.failures.len(), 2);
    assert!(errors.failures.iter().all(|f| f.error.is_not_found()));
}

#[test]
fn test_delete_all_empty_is_ok() {
    let h = Harness::new();
    h.dav.delete_all(Vec::<String>::new()).unwrap();
    assert!(h.server.calls().is_empty());
}

// =============================================================================
// Property operations
// =============================================================================

#[test]
fn test_proppatch_then_propfind_remote() {
    let h = Harness::new();
    let url = "https://dav.example.com/doc.txt";
    h.server.insert(url, b"doc");

    h.dav.proppatch(url, "<Z:author xmlns:Z=\"urn:z\">alice</Z:author>").unwrap();
    assert_eq!(h.server.properties(url).len(), 1);

    let xml = h.dav.propfind(url).unwrap();
    assert!(xml.contains("<Z:author xmlns:Z=\"urn:z\">alice</Z:author>"));
}

#[test]
fn test_property_operations_reject_local_targets() {
    let h = Harness::new();

    let err = h.dav.propfind("notes.txt").unwrap_err();
    assert!(matches!(err, DavError::Unsupported { operation: "propfind", .. }));

    let err = h.dav.proppatch("/tmp/notes.txt", "<x/>").unwrap_err();
    assert!(matches!(err, DavError::Unsupported { operation: "proppatch", .. }));

    assert_eq!(h.connector.connect_count(), 0);
}

// =============================================================================
// Session pooling
// =============================================================================

#[test]
fn test_session_reused_across_operations_on_same_host() {
    let h = Harness::new();

    let file = h
        .dav
        .open("https://dav.example.com/a", OpenMode::Write, &OpenOptions::new())
        .unwrap();
    file.close().unwrap();
    h.dav.mkdir("https://dav.example.com/b/").unwrap();
    h.dav.exists("https://dav.example.com/a").unwrap();

    assert_eq!(h.connector.connect_count(), 1);
    assert_eq!(h.prompt.prompts(), 2); // username + password, once
    assert!(h.dav.pool().contains_host("dav.example.com"));
}

#[test]
fn test_each_host_resolves_once() {
    let h = Harness::new();

    h.dav.mkdir("https://one.example.com/x/").unwrap();
    h.dav.mkdir("https://two.example.com/x/").unwrap();
    h.dav.mkdir("https://one.example.com/y/").unwrap();

    assert_eq!(h.connector.connect_count(), 2);
    assert_eq!(h.dav.pool().len(), 2);
}

#[test]
fn test_pooled_session_carries_resolved_username() {
    let h = Harness::new();
    h.dav.mkdir("https://dav.example.com/x/").unwrap();

    let call = &h.server.calls()[0];
    assert_eq!(call.username.as_deref(), Some("alice"));
}

#[test]
fn test_concurrent_first_access_resolves_once() {
    let h = Arc::new(Harness::new());

    let workers: Vec<_> = (0..8)
        .map(|i| {
            let h = Arc::clone(&h);
            thread::spawn(move || {
                h.dav
                    .mkdir(&format!("https://dav.example.com/dir-{i}/"))
                    .unwrap();
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    assert_eq!(h.connector.connect_count(), 1);
    assert_eq!(h.prompt.password_prompts.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(h.server.count("MKCOL"), 8);
}

// =============================================================================
// Credential resolution failures
// =============================================================================

#[test]
fn test_unavailable_prompt_aborts_operation() {
    let prompt = ScriptedPrompt::new("unused", "unused");
    let h = Harness::with_resolver(prompt, CredentialResolver::new(NoTerminalPrompt));

    let err = h.dav.mkdir("https://dav.example.com/x/").unwrap_err();
    assert!(matches!(
        err,
        DavError::Credentials(CredentialError::PromptUnavailable { .. })
    ));
    assert!(h.server.calls().is_empty());
    assert!(h.dav.pool().is_empty());
}

#[test]
fn test_failed_resolution_is_retried_on_next_call() {
    let prompt = ScriptedPrompt::new("unused", "unused");
    let h = Harness::with_resolver(prompt, CredentialResolver::new(NoTerminalPrompt));

    assert!(h.dav.exists("https://dav.example.com/x").is_err());
    assert!(h.dav.exists("https://dav.example.com/x").is_err());
    assert_eq!(h.connector.connect_count(), 2);
}

#[test]
fn test_broken_secret_store_aborts_operation() {
    let prompt = ScriptedPrompt::new("alice", "pw");
    let store = MemorySecretStore::broken();
    let resolver = CredentialResolver::new(prompt.clone()).with_secret_store(store);
    let h = Harness::with_resolver(prompt, resolver);

    let err = h.dav.mkdir("https://dav.example.com/x/").unwrap_err();
    assert!(matches!(
        err,
        DavError::Credentials(CredentialError::SecretStore { .. })
    ));
    assert_eq!(h.prompt.password_prompts.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[test]
fn test_prompted_password_is_saved_to_secret_store() {
    let prompt = ScriptedPrompt::new("alice", "pw");
    let store = MemorySecretStore::default();
    let resolver = CredentialResolver::new(prompt.clone()).with_secret_store(store.clone());
    let h = Harness::with_resolver(prompt, resolver);

    h.dav.mkdir("https://dav.example.com/x/").unwrap();
    assert_eq!(store.stored("dav.example.com", "alice").as_deref(), Some("pw"));
}

#[test]
fn test_environment_credentials_skip_prompt() {
    let prompt = ScriptedPrompt::new("unused", "unused");
    let env = EnvCredentials {
        username: Some("envuser".to_string()),
        password: Some(SecretString::from("envpass".to_string())),
    };
    let resolver = CredentialResolver::new(prompt.clone()).with_env(env);
    let h = Harness::with_resolver(prompt, resolver);

    h.dav.mkdir("https://dav.example.com/x/").unwrap();
    assert_eq!(h.prompt.prompts(), 0);
    assert_eq!(h.server.calls()[0].username.as_deref(), Some("envuser"));
}

// =============================================================================
// Malformed remote targets
// =============================================================================

#[test]
fn test_unparseable_url_surfaces_host_error() {
    let h = Harness::new();

    assert!(matches!(h.dav.exists("https://"), Err(DavError::HostParse { .. })));
    assert!(matches!(
        h.dav.open("http://bad host/x", OpenMode::Write, &OpenOptions::new()),
        Err(DavError::HostParse { .. })
    ));
    assert_eq!(h.connector.connect_count(), 0);
}
