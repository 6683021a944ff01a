mod common;

use common::{BOB, GONE, MINE, MockClient, ROOT, run_session};
use serde_json::json;
use skythread::SkythreadError;
use skythread::config::LaunchOptions;

fn creds() -> serde_json::Value {
    json!({ "username": "me.test", "password": "app-password" })
}

fn creds_with_url(url: &str) -> serde_json::Value {
    json!({ "username": "me.test", "password": "app-password", "bluesky_url": url })
}

#[tokio::test]
async fn prompts_for_a_post_when_credentials_have_no_url() {
    let client = MockClient::world();
    let (result, out) = run_session(
        client.clone(),
        creds(),
        LaunchOptions::default(),
        &format!("{ROOT}\nq\n"),
    )
    .await;
    result.unwrap();

    assert!(out.contains("Logging in to Bluesky...\nLogin successful!"));
    assert!(out.contains("No initial URL provided in credentials.\nStarting in interactive mode..."));
    assert!(out.contains("Enter a Bluesky URL or AT URI: "));
    assert!(out.contains(&format!("Processing: {ROOT}")));
    assert!(out.contains("Bluesky Web URL: https://bsky.app/profile/did:plc:alice/post/root1"));
    assert!(out.contains("Author: Alice (@alice.test)"));
    assert!(out.contains("Posted: 2024-01-01T00:00:00.000Z"));
    assert!(out.contains("Text: hello from alice"));
    assert!(out.contains(
        "  [1] a cat: https://cdn.bsky.app/img/feed_fullsize/plain/did:plc:alice/bafkreicat@jpeg"
    ));
    assert!(!out.contains("THREAD CONTEXT"));
    assert!(out.contains("[1] @bob.test replied at 2024-01-02T00:00:00.000Z:\n  bob agrees"));
    assert!(out.contains(&format!("REPLY URIS (for quick access)\n{}\n[1] {BOB}", "-".repeat(80))));
    assert!(out.contains("  @carol.test liked at 2024-05-01T00:00:00.000Z"));
    assert!(out.contains("[1] Dave (@dave.test) quoted at 2024-06-01T00:00:00.000Z:\n  look at this"));
    assert!(out.contains("[1-1] View reply\n[n] Enter new URI/URL\n[q] Quit"));
    assert!(!out.contains("[p] View parent post"));
    assert!(out.ends_with("Exiting...\n"));

    let calls = client.calls().await;
    assert_eq!(calls[0].nsid, "com.atproto.server.createSession");
    assert_eq!(calls[0].host, "bsky.social");
    assert_eq!(calls[0].body["identifier"], "me.test");
    assert!(client.calls_to("com.atproto.identity.resolveHandle").await.is_empty());

    let get_record = &client.calls_to("com.atproto.repo.getRecord").await[0];
    assert_eq!(get_record.host, "pds.example");
    assert_eq!(get_record.auth.as_deref(), Some("Bearer access-token"));
    assert_eq!(get_record.query["repo"], "did:plc:alice");
    assert_eq!(get_record.query["collection"], "app.bsky.feed.post");
    assert_eq!(get_record.query["rkey"], "root1");

    let thread = &client.calls_to("app.bsky.feed.getPostThread").await;
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0].query["depth"], "1");
    assert_eq!(
        client.calls_to("app.bsky.feed.getLikes").await[0].query["limit"],
        "10"
    );
}

#[tokio::test]
async fn at_uri_input_is_used_verbatim() {
    let client = MockClient::world();
    let (result, out) = run_session(
        client.clone(),
        creds_with_url("https://bsky.app/profile/alice.test/post/root1"),
        LaunchOptions::default(),
        &format!("n\n{BOB}\nq\n"),
    )
    .await;
    result.unwrap();

    assert!(out.contains("Found URL in credentials: https://bsky.app/profile/alice.test/post/root1"));
    assert!(out.contains("Handle or DID: alice.test, Record key: root1"));
    assert!(out.contains("Resolved handle alice.test to DID: did:plc:alice"));
    assert!(out.contains(&format!("Processing: {ROOT}")));
    assert!(out.contains(&format!("Processing: {BOB}")));

    let resolves = client.calls_to("com.atproto.identity.resolveHandle").await;
    assert_eq!(resolves.len(), 1);
    assert_eq!(resolves[0].query["handle"], "alice.test");

    let repos: Vec<_> = client
        .calls_to("com.atproto.repo.getRecord")
        .await
        .into_iter()
        .map(|c| c.query["repo"].clone())
        .collect();
    assert!(repos.contains(&"did:plc:bob".to_owned()));
}

#[tokio::test]
async fn did_urls_are_not_resolved() {
    let client = MockClient::world();
    let (result, out) = run_session(
        client.clone(),
        creds_with_url("https://bsky.app/profile/did:plc:alice/post/root1"),
        LaunchOptions::default(),
        "q\n",
    )
    .await;
    result.unwrap();
    assert!(out.contains("Using DID directly"));
    assert!(out.contains(&format!("Processing: {ROOT}")));
    assert!(client.calls_to("com.atproto.identity.resolveHandle").await.is_empty());
}

#[tokio::test]
async fn walks_down_and_back_up_a_thread() {
    let client = MockClient::world();
    let (result, out) = run_session(
        client,
        creds_with_url(ROOT),
        LaunchOptions::default(),
        "1\n1\np\nr\nq\n",
    )
    .await;
    result.unwrap();

    assert_eq!(out.matches(&format!("Processing: {ROOT}")).count(), 1);
    assert_eq!(out.matches(&format!("Processing: {BOB}")).count(), 2);
    assert_eq!(out.matches(&format!("Processing: {MINE}")).count(), 1);

    // bob's reply: parent and root are the same post
    assert!(out.contains(&format!("[p] View parent post: {ROOT}")));
    assert!(out.contains("PARENT POST:\n  Author: Alice (@alice.test)"));
    assert!(out.contains("CURRENT POST:\n  Author: did:plc:bob"));
    assert!(out.contains(&format!("\n[2] (post not found)\n  URI: {GONE}")));

    // our own reply: record text is empty, thread view fills it in
    assert!(out.contains("Text: my reply via appview"));
    assert!(out.contains("ROOT POST:\n  Author: Alice (@alice.test)"));
    assert!(out.contains("PARENT POST:\n  Author: @bob.test"));
    assert!(out.contains("CURRENT POST:\n  Author: You"));
    assert!(out.contains(&format!("[r] View root post: {ROOT}")));
    assert!(out.contains("No direct replies found."));

    // `r` on bob's post, where root == parent
    assert!(out.contains("Invalid option"));
}

#[tokio::test]
async fn errors_leave_state_untouched() {
    let missing = "at://did:plc:alice/app.bsky.feed.post/missing";
    let client = MockClient::world();
    let (result, out) = run_session(
        client,
        creds_with_url(ROOT),
        LaunchOptions::default(),
        &format!("n\n{missing}\n1\n5\n0\n2\nhello\nn\nhello\nq\n"),
    )
    .await;
    result.unwrap();

    assert!(out.contains(&format!("Error processing input: error fetching post {missing}")));
    // still on the root post, so `1` is bob's reply
    assert!(out.contains(&format!("Processing: {BOB}")));
    assert!(out.contains("Invalid reply number. Please choose 1-2"));
    assert_eq!(out.matches("Invalid reply number").count(), 2);
    assert!(out.contains("Reply 2 is unavailable"));
    assert!(out.contains("Invalid option"));
    assert!(out.contains("Invalid input. Please enter a valid Bluesky URL or AT URI."));
    assert!(out.ends_with("Exiting...\n"));
}

#[tokio::test]
async fn initial_prompt_retries_until_a_post_displays() {
    let client = MockClient::world();
    let (result, out) = run_session(
        client.clone(),
        creds(),
        LaunchOptions::default(),
        &format!("\nhttps://bsky.app/profile/ghost.test/post/abc\nnot a url\n{ROOT}\n"),
    )
    .await;
    result.unwrap();

    assert!(out.contains("Error processing input: failed to resolve handle ghost.test"));
    assert!(out.contains("Invalid input. Please enter a valid Bluesky URL or AT URI."));
    assert!(out.contains(&format!("Processing: {ROOT}")));
    // end of input at the option prompt quits
    assert!(out.ends_with("Enter option: \nExiting...\n"));
    assert_eq!(
        client.calls_to("com.atproto.identity.resolveHandle").await.len(),
        1
    );
}

#[tokio::test]
async fn broken_initial_url_falls_through_to_the_loop() {
    let client = MockClient::world();
    let (result, out) = run_session(
        client,
        creds_with_url("at://did:plc:alice/app.bsky.feed.post/missing"),
        LaunchOptions::default(),
        "p\n1\nq\n",
    )
    .await;
    result.unwrap();

    assert!(out.contains("Error processing initial URL from credentials: error fetching post"));
    assert!(out.contains("Continuing to interactive mode..."));
    assert_eq!(out.matches("Invalid option").count(), 2);
}

#[tokio::test]
async fn eof_at_initial_prompt_exits_cleanly() {
    let (result, out) =
        run_session(MockClient::world(), creds(), LaunchOptions::default(), "").await;
    result.unwrap();
    assert!(out.ends_with("Enter a Bluesky URL or AT URI: \nExiting...\n"));
}

#[tokio::test]
async fn zero_limits_hide_likes_and_quotes() {
    let client = MockClient::world();
    let options = LaunchOptions {
        likes_limit: Some(0),
        quotes_limit: Some(0),
        ..Default::default()
    };
    let (result, out) = run_session(client.clone(), creds_with_url(ROOT), options, "q\n").await;
    result.unwrap();
    assert!(!out.contains("LIKES"));
    assert!(!out.contains("QUOTES"));
    assert!(client.calls_to("app.bsky.feed.getLikes").await.is_empty());
    assert!(client.calls_to("app.bsky.feed.getQuotes").await.is_empty());
}

#[tokio::test]
async fn secondary_failures_do_not_abort_the_display() {
    let client = MockClient::new(|nsid, q| match nsid {
        "app.bsky.feed.getPostThread" | "app.bsky.feed.getLikes" | "app.bsky.actor.getProfile" => {
            (502, json!({ "error": "UpstreamFailure" }))
        }
        _ => common::world(nsid, q),
    });
    let (result, out) = run_session(client, creds_with_url(ROOT), LaunchOptions::default(), "1\nq\n").await;
    result.unwrap();

    assert!(out.contains("Author DID: did:plc:alice (Unable to fetch profile:"));
    assert!(out.contains("Text: hello from alice"));
    assert!(out.contains("Error fetching replies:"));
    assert!(out.contains("Error fetching likes:"));
    assert!(out.contains("QUOTES"));
    assert!(!out.contains("View reply"));
    // without a thread there are no replies to pick
    assert!(out.contains("Invalid option"));
}

#[tokio::test]
async fn missing_password_is_fatal() {
    let client = MockClient::world();
    let (result, out) = run_session(
        client.clone(),
        json!({ "username": "me.test" }),
        LaunchOptions::default(),
        "",
    )
    .await;
    assert!(matches!(result, Err(SkythreadError::CredentialsInvalid { .. })));
    assert!(!out.contains("Logging in"));
    assert!(client.calls().await.is_empty());
}

#[tokio::test]
async fn rejected_login_is_fatal() {
    let client = MockClient::new(|nsid, _| match nsid {
        "com.atproto.server.createSession" => (
            401,
            json!({ "error": "AuthenticationRequired", "message": "Invalid identifier or password" }),
        ),
        _ => panic!("unexpected call to {nsid}"),
    });
    let (result, out) = run_session(client, creds_with_url(ROOT), LaunchOptions::default(), "").await;
    let err = result.unwrap_err();
    assert!(matches!(err, SkythreadError::LoginFailed(_)));
    assert!(err.to_string().contains("Invalid identifier or password"));
    assert!(out.contains("Logging in to Bluesky..."));
    assert!(!out.contains("Login successful!"));
}

#[tokio::test]
async fn context_profile_failure_is_reported() {
    let client = MockClient::new(|nsid, q| match nsid {
        "app.bsky.actor.getProfile" if q["actor"] == "did:plc:alice" => {
            (502, json!({ "error": "UpstreamFailure" }))
        }
        _ => common::world(nsid, q),
    });
    let (result, out) = run_session(client, creds_with_url(BOB), LaunchOptions::default(), "q\n").await;
    result.unwrap();

    // bob's own profile still loads
    assert!(out.contains("Author: @bob.test (did:plc:bob)"));
    assert!(out.contains(
        "PARENT POST:\n  Author: did:plc:alice (Unable to fetch profile: HTTP 502"
    ));
    assert!(out.contains("  Text: hello from alice"));
}

#[tokio::test]
async fn garbled_input_line_is_just_an_invalid_option() {
    let client = MockClient::world();
    let (result, out) = run_session(
        client,
        creds_with_url(ROOT),
        LaunchOptions::default(),
        b"\xff\xfe\n1\nq\n",
    )
    .await;
    result.unwrap();

    assert!(out.contains("Invalid option"));
    assert!(out.contains(&format!("Processing: {BOB}")));
    assert!(out.ends_with("Exiting...\n"));
}
