//! Capability negotiation over a real socket.

mod common;

use std::time::Duration;

use common::TestServer;

#[tokio::test]
async fn ls_lists_offered_capabilities() -> anyhow::Result<()> {
    let server = TestServer::spawn().await?;
    let mut client = server.connect("alice").await?;

    client.send_raw("CAP LS").await?;
    assert_eq!(client.recv_line().await?, ":irc.test CAP * LS :a b");

    // LS is answered the same way no matter what came before.
    client.send_raw("CAP REQ :a").await?;
    client.recv_line().await?;
    client.send_raw("CAP LS 302").await?;
    assert_eq!(client.recv_line().await?, ":irc.test CAP * LS :a b");

    server.server().close().await;
    Ok(())
}

#[tokio::test]
async fn req_with_unknown_name_is_rejected_whole() -> anyhow::Result<()> {
    let server = TestServer::spawn().await?;
    let mut client = server.connect("alice").await?;

    client.send_raw("CAP REQ :a c").await?;
    assert_eq!(client.recv_line().await?, ":irc.test CAP * NAK :a c");

    client.send_raw("CAP LIST").await?;
    assert_eq!(client.recv_line().await?, ":irc.test CAP * LIST :");

    server.server().close().await;
    Ok(())
}

#[tokio::test]
async fn req_of_offered_names_is_acknowledged() -> anyhow::Result<()> {
    let server = TestServer::spawn().await?;
    let mut client = server.connect("alice").await?;

    client.send_raw("CAP REQ :a").await?;
    assert_eq!(client.recv_line().await?, ":irc.test CAP * ACK :a");

    client.send_raw("CAP REQ :b a").await?;
    assert_eq!(client.recv_line().await?, ":irc.test CAP * ACK :b a");

    client.send_raw("CAP LIST").await?;
    assert_eq!(client.recv_line().await?, ":irc.test CAP * LIST :a b");

    server.server().close().await;
    Ok(())
}

#[tokio::test]
async fn replies_use_nickname_once_set() -> anyhow::Result<()> {
    let server = TestServer::spawn().await?;
    let mut client = server.connect("alice").await?;

    client.send_raw("NICK alice").await?;
    client.send_raw("CAP LS").await?;
    assert_eq!(client.recv_line().await?, ":irc.test CAP alice LS :a b");

    server.server().close().await;
    Ok(())
}

#[tokio::test]
async fn registration_waits_for_cap_end() -> anyhow::Result<()> {
    let server = TestServer::spawn().await?;
    let mut client = server.connect("alice").await?;

    client.send_raw("CAP LS").await?;
    client.recv_line().await?;
    client.send_raw("NICK alice").await?;
    client.send_raw("USER alice 0 * :Alice").await?;
    client.expect_silence(Duration::from_millis(200)).await?;

    client.send_raw("CAP END").await?;
    assert_eq!(client.recv_line().await?, ":irc.test 001 alice :Welcome to IRC");

    server.server().close().await;
    Ok(())
}

#[tokio::test]
async fn registration_without_negotiation_is_immediate() -> anyhow::Result<()> {
    let server = TestServer::spawn().await?;
    let mut client = server.connect("bob").await?;

    client.register().await?;

    server.server().close().await;
    Ok(())
}

#[tokio::test]
async fn unknown_subcommand_is_invalid() -> anyhow::Result<()> {
    let server = TestServer::spawn().await?;
    let mut client = server.connect("alice").await?;

    client.send_raw("CAP FOO").await?;
    assert_eq!(
        client.recv_line().await?,
        ":irc.test 410 * FOO :Invalid CAP command"
    );

    client.send_raw("CAP X LS").await?;
    assert_eq!(
        client.recv_line().await?,
        ":irc.test 410 * X :Invalid CAP command"
    );

    client.send_raw("CAP ACK :a").await?;
    assert_eq!(
        client.recv_line().await?,
        ":irc.test 410 * ACK :Invalid CAP command"
    );

    server.server().close().await;
    Ok(())
}
