/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

extern crate flickr;

use anyhow::Result;
use dotenvy::dotenv;
use flickr::rest::{AppCreds, Client, CorrelationId, Person};
use futures::StreamExt;
use std::collections::HashMap;

// Looks up every username given on the command line at the same time and prints the
// results as they arrive, which is not necessarily the order they were asked for.
#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();
    let client = Client::new(AppCreds::from_env()?);
    let (invoker, completions) = client.invoker();
    let anon = invoker.anonymous();

    let mut pending: HashMap<CorrelationId, String> = HashMap::new();
    for name in std::env::args().skip(1) {
        let id = Person::find_by_username(&anon, &name)?;
        pending.insert(id, name);
    }

    let stream = completions.into_stream();
    futures::pin_mut!(stream);
    while !pending.is_empty() {
        let Some(done) = stream.next().await else {
            break;
        };
        let Some(name) = pending.remove(&done.id) else {
            continue;
        };
        match Person::from_outcome(done.outcome).into_result() {
            Ok(person) => println!("{name}: {person}"),
            Err(err) => println!("{name}: lookup failed, {err}"),
        }
    }
    Ok(())
}
