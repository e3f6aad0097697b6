/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

extern crate flickr;

use anyhow::{Result, anyhow};
use dotenvy::dotenv;
use flickr::rest::{
    AppCreds, Client, Credential, HandshakeCompletions, HandshakeCoordinator, HandshakeState,
    Person, PermissionLevel,
};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tokio::io::AsyncBufReadExt;

// Runs the whole handshake, asking the user to approve in their browser
async fn run_handshake(
    auth: &HandshakeCoordinator,
    events: &mut HandshakeCompletions,
    permission: PermissionLevel,
) -> Result<Credential> {
    let mut state = HandshakeState::default();

    auth.request_grant(permission)?;
    let done = events.grants.recv().await.ok_or_else(|| anyhow!("no grant completion"))?;
    state = state.on_grant_outcome(done.outcome)?;
    let grant = state.grant().ok_or_else(|| anyhow!("grant request failed: {:?}", state))?;

    println!("Open this URL and approve access, then press enter:\n{}", grant.approval_url());
    let mut line = String::new();
    tokio::io::BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;
    let state = state.approved()?;

    let grant = state.grant().ok_or_else(|| anyhow!("grant lost"))?.grant().to_string();
    auth.exchange_grant_for_credential(&grant)?;
    let done = events
        .credentials
        .recv()
        .await
        .ok_or_else(|| anyhow!("no credential completion"))?;
    match state.on_credential_outcome(done.outcome)? {
        HandshakeState::CredentialIssued(credential) => Ok(credential),
        other => Err(anyhow!("handshake did not finish: {:?}", other)),
    }
}

// Loads a previously saved credential and makes sure the service still accepts it
async fn load_credential(
    path: &Path,
    auth: &HandshakeCoordinator,
    events: &mut HandshakeCompletions,
) -> Result<Option<Credential>> {
    let Ok(file) = File::open(path) else {
        return Ok(None);
    };
    let saved: Credential = serde_json::from_reader(BufReader::new(file))?;
    auth.check_credential(saved.token())?;
    let done = events
        .credentials
        .recv()
        .await
        .ok_or_else(|| anyhow!("no credential completion"))?;
    match done.outcome.into_result() {
        Ok(credential) => Ok(Some(credential)),
        Err(err) => {
            println!("Saved credential rejected ({err}), starting over");
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();
    let creds = AppCreds::from_env()?;
    let cache: PathBuf = std::env::var("FLICKR_AUTH_CACHE")
        .unwrap_or_else(|_| "flickr_auth.json".to_string())
        .into();

    let client = Client::new(creds);
    let (auth, mut events) = client.handshake();

    let credential = match load_credential(&cache, &auth, &mut events).await? {
        Some(credential) => credential,
        None => {
            let credential = run_handshake(&auth, &mut events, PermissionLevel::Read).await?;
            let file = File::create(&cache)?;
            serde_json::to_writer_pretty(BufWriter::new(file), &credential)?;
            credential
        }
    };
    println!("Authorized: {}", credential);

    let (invoker, mut completions) = client.invoker();
    let id = Person::test_login(&invoker, &credential)?;
    while let Some(done) = completions.recv().await {
        if done.id == id {
            println!("Service says we are {}", Person::from_outcome(done.outcome).into_result()?);
            break;
        }
    }
    Ok(())
}
