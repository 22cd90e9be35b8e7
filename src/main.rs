// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

#![forbid(non_ascii_idents)]
#![deny(unsafe_code)]

use std::path::Path;

use anyhow::{anyhow, bail};
use clap::{Arg, ArgMatches, Command, arg, value_parser};
use log::{error, info};
use serde_json::{Map, Value, json};

use freebox_cover::configuration::{DEF_CONFIG_FILE, Settings, get_configuration};
use freebox_cover::cover::{
    CoverEntity, EntityCommand, FreeboxCover, handle_cover_command, refresh_cover_attributes,
};
use freebox_cover::freebox::FreeboxClient;
use freebox_cover::{APP_VERSION, built_info};

#[actix::main]
async fn main() -> anyhow::Result<()> {
    let args = Command::new(built_info::PKG_NAME)
        .author("Unfolded Circle ApS")
        .version(APP_VERSION)
        .about("Freebox home shutter control")
        .arg(arg!(-c --config <FILE> "Configuration file").required(false))
        .arg(
            arg!(-t --token <TOKEN> "Freebox OS session token. A token file in FBX_TOKENS_HOME takes precedence")
                .required(false),
        )
        .arg(
            arg!(--cover <ID> "Cover identifier. All configured covers if not specified")
                .required(false),
        )
        .arg(
            arg!(--position <POSITION> "Target position for the position command: 0 = closed, 100 = open")
                .required(false)
                .value_parser(value_parser!(u8).range(0..=100)),
        )
        .arg(
            Arg::new("command")
                .value_parser(["status", "open", "close", "stop", "position"])
                .default_value("status")
                .help("Cover command"),
        )
        .get_matches();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg_file = match args.get_one::<String>("config") {
        None => {
            if Path::new(DEF_CONFIG_FILE).exists() {
                info!("Loading default configuration file: {}", DEF_CONFIG_FILE);
                Some(DEF_CONFIG_FILE)
            } else {
                None
            }
        }
        Some(c) => Some(c.as_str()),
    };
    let mut cfg = get_configuration(cfg_file)?;
    if let Some(token) = args.get_one::<String>("token") {
        cfg.freebox.set_session_token(token);
    }

    let mut covers = create_covers(&cfg, args.get_one::<String>("cover"))?;
    let command = args
        .get_one::<String>("command")
        .map(|v| v.as_str())
        .unwrap_or("status");

    if command == "status" {
        return print_status(&mut covers).await;
    }

    let params = command_params(&args);
    let mut failed = 0;
    for cover in &covers {
        let cmd = EntityCommand::new(
            cover.unique_id().to_string(),
            command.to_string(),
            params.clone(),
        );
        if let Err(e) = handle_cover_command(cover, &cmd).await {
            error!("[{}] {command} failed: {e}", cmd.entity_id);
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{failed} of {} cover command(s) failed", covers.len());
    }
    Ok(())
}

fn create_covers(
    cfg: &Settings,
    cover_id: Option<&String>,
) -> anyhow::Result<Vec<FreeboxCover<FreeboxClient>>> {
    let client = FreeboxClient::new(&cfg.freebox)?;

    let covers: Vec<_> = cfg
        .covers
        .iter()
        .filter(|c| cover_id.is_none_or(|id| &c.unique_id() == id))
        .map(|c| FreeboxCover::new(client.clone(), c))
        .collect();

    if covers.is_empty() {
        return Err(match cover_id {
            Some(id) => anyhow!("Cover not found in configuration: {id}"),
            None => anyhow!("No covers configured"),
        });
    }

    Ok(covers)
}

fn command_params(args: &ArgMatches) -> Option<Map<String, Value>> {
    args.get_one::<u8>("position").map(|position| {
        let mut params = Map::new();
        params.insert("position".into(), json!(position));
        params
    })
}

async fn print_status(covers: &mut [FreeboxCover<FreeboxClient>]) -> anyhow::Result<()> {
    let (states, failed) = refresh_cover_attributes(covers).await;

    println!("{}", serde_json::to_string_pretty(&states)?);

    if failed > 0 {
        bail!("{failed} of {} cover update(s) failed", covers.len());
    }
    Ok(())
}
