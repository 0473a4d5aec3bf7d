use std::path::PathBuf;

use anyhow::{Context, Result};

use worksheets::bundle_states::{explain, highlight, states};
use worksheets::config::ClientConfig;
use worksheets::gateway::{RestClient, SignupForm, SignupOutcome};
use worksheets::model::{Block, BlockBody, BundleState, BundleType};
use worksheets::terminal::{Segment, is_full_uuid, parse_ui_actions, rewrite_refs, trim_output};
use worksheets::worksheet::WorksheetModel;

use crate::cli_runtime::Ctx;
use crate::{Commands, ConfigCommands};

fn client(config: &ClientConfig) -> Result<RestClient> {
    RestClient::new(&config.base_url, config.request_timeout())
}

/// Worksheet uuid for `spec`, falling back to the configured worksheet.
fn require_worksheet(ctx: &Ctx, client: &RestClient, spec: Option<&str>) -> Result<String> {
    let spec = spec
        .or(ctx.config.default_worksheet.as_deref())
        .context("no worksheet given (use --worksheet or set default_worksheet)")?;
    if is_full_uuid(spec) {
        return Ok(spec.to_string());
    }
    let found = client
        .resolve_worksheet(spec)
        .with_context(|| format!("resolve worksheet `{}`", spec))?
        .with_context(|| format!("no worksheet named `{}`", spec))?;
    Ok(found.id)
}

pub(crate) fn handle_command(ctx: &Ctx, command: Commands) -> Result<()> {
    match command {
        Commands::Show { worksheet, json } => {
            let client = client(&ctx.config)?;
            let uuid = require_worksheet(ctx, &client, worksheet.as_deref())?;
            let ws = client
                .get_worksheet(&uuid)
                .with_context(|| format!("get worksheet {}", uuid))?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&ws).context("serialize worksheet json")?
                );
                return Ok(());
            }
            let model = WorksheetModel::from_worksheet(ws).context("load worksheet")?;
            println!("{} ({})", model.title().unwrap_or(model.name()), model.uuid());
            println!("revision: {}", model.revision());
            println!(
                "access: {}",
                if model.edit_permission() { "edit" } else { "read-only" }
            );
            println!();
            for block in model.blocks() {
                println!("{}", describe_block(block));
            }
        }

        Commands::Cli { command, json } => {
            let client = client(&ctx.config)?;
            let uuid = require_worksheet(ctx, &client, None)?;
            let line = command.join(" ");
            let resp = client
                .execute_command(&uuid, &line)
                .with_context(|| format!("execute `{}`", line))?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&resp).context("serialize response json")?
                );
                return Ok(());
            }

            let structured = resp.structured_result.unwrap_or_default();
            let output = trim_output(&resp.output);
            if !output.is_empty() {
                let rendered = rewrite_refs(output, &structured.refs);
                let text: String = rendered
                    .segments
                    .iter()
                    .map(|seg| match seg {
                        Segment::Text(t) => t.clone(),
                        Segment::Link { text, href, .. } => {
                            format!("{} <{}{}>", text, ctx.config.base_url, href)
                        }
                    })
                    .collect();
                println!("{}", text);
                for diag in rendered.diagnostics {
                    eprintln!("note: {}", diag);
                }
            }
            for action in parse_ui_actions(&structured.ui_actions) {
                tracing::info!(?action, "ui action ignored outside the TUI");
            }
            if let Some(exception) = resp.exception.as_deref().filter(|e| !e.is_empty()) {
                anyhow::bail!("{}", trim_output(exception));
            }
        }

        Commands::Complete { prefix } => {
            let client = client(&ctx.config)?;
            let uuid = require_worksheet(ctx, &client, None)?;
            let completions = client
                .complete_command(&uuid, &prefix)
                .context("complete command")?;
            for c in completions {
                println!("{}", c);
            }
        }

        Commands::Bundle { uuid, json } => {
            let client = client(&ctx.config)?;
            let info = client
                .get_bundle(&uuid)
                .with_context(|| format!("get bundle {}", uuid))?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&info).context("serialize bundle json")?
                );
                return Ok(());
            }
            println!("uuid: {}", info.uuid);
            println!("name: {}", info.name());
            println!("type: {}", info.bundle_type);
            println!("state: {}", info.state);
            if let Some(state) = info.state() {
                print_ladder(info.kind(), Some(state));
            }
        }

        Commands::Download { uuid, output } => {
            let client = client(&ctx.config)?;
            let dest = output.unwrap_or_else(|| PathBuf::from(&uuid));
            let bytes = client
                .download_contents(&uuid)
                .with_context(|| format!("download bundle {}", uuid))?;
            std::fs::write(&dest, &bytes)
                .with_context(|| format!("write {}", dest.display()))?;
            println!("Wrote {} bytes to {}", bytes.len(), dest.display());
        }

        Commands::States { bundle_type, state } => {
            let kind = match bundle_type.as_deref() {
                Some(t) => Some(
                    BundleType::parse(t).with_context(|| format!("unknown bundle type `{}`", t))?,
                ),
                None => None,
            };
            let state = match state.as_deref() {
                Some(s) => Some(
                    BundleState::parse(s).with_context(|| format!("unknown bundle state `{}`", s))?,
                ),
                None => None,
            };
            print_ladder(kind, state);
        }

        Commands::Feedback { message } => {
            let client = client(&ctx.config)?;
            client
                .send_help_message(&message)
                .context("send help message")?;
            println!("Message sent");
        }

        Commands::Signup {
            email,
            username,
            password,
            first_name,
            last_name,
            affiliation,
            captcha_token,
        } => {
            let client = client(&ctx.config)?;
            let form = SignupForm {
                email,
                username,
                confirm_password: password.clone(),
                password,
                first_name: first_name.unwrap_or_default(),
                last_name: last_name.unwrap_or_default(),
                affiliation: affiliation.unwrap_or_default(),
                captcha_token,
            };
            match client.signup(&form).context("sign up")? {
                SignupOutcome::Created => {
                    println!("Account created; check your email to verify it")
                }
                SignupOutcome::Rejected => anyhow::bail!("sign-up rejected by the server"),
            }
        }

        Commands::Config { command } => match command {
            ConfigCommands::Show { json } => {
                if json {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&ctx.config)
                            .context("serialize config json")?
                    );
                } else {
                    println!("file: {}", ctx.config_path.display());
                    println!("base_url: {}", ctx.config.base_url);
                    println!(
                        "default_worksheet: {}",
                        ctx.config.default_worksheet.as_deref().unwrap_or("(none)")
                    );
                    println!(
                        "terminal: min {} rows, default {} rows",
                        ctx.config.terminal.min_height, ctx.config.terminal.default_height
                    );
                }
            }
            ConfigCommands::Init { force } => {
                if ctx.config_path.exists() && !force {
                    anyhow::bail!(
                        "{} already exists (use --force to overwrite)",
                        ctx.config_path.display()
                    );
                }
                ClientConfig::default().write(&ctx.config_path)?;
                println!("Wrote {}", ctx.config_path.display());
            }
        },
    }

    Ok(())
}

fn print_ladder(kind: Option<BundleType>, state: Option<BundleState>) {
    let ladder = states(kind);
    let current = state.and_then(|s| highlight(&ladder, s));
    for (i, rung) in ladder.iter().enumerate() {
        let marker = if Some(i) == current { ">" } else { " " };
        match rung.qualifier {
            Some(q) => println!("{} {} ({})", marker, rung.rung.label(), q),
            None => println!("{} {}", marker, rung.rung.label()),
        }
    }
    if let Some(state) = state {
        let text = explain(kind, state);
        if !text.is_empty() {
            println!();
            println!("{}", text);
        }
    }
}

fn describe_block(block: &Block) -> String {
    let mode = block.mode().as_str();
    let detail = match &block.body {
        BlockBody::Markdown(m) => m.text.lines().next().unwrap_or("").to_string(),
        BlockBody::BundleRow(b) => {
            let info = &b.bundle_info;
            format!("{} {} [{}]", info.short_uuid(), info.name(), info.state)
        }
        BlockBody::TableBlock(t) => format!("{} ({} rows)", t.header.join(" | "), t.rows.len()),
        BlockBody::SchemaBlock(s) => format!("{} ({} fields)", s.schema_name, s.field_rows.len()),
        BlockBody::SubworksheetsBlock(s) => s
            .subworksheet_infos
            .iter()
            .map(|w| w.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        BlockBody::ImageBlock(i) => i.path.clone().unwrap_or_default(),
        BlockBody::RecordBlock(r) => format!("{} fields", r.rows.len()),
        BlockBody::GraphBlock(g) => format!("{} trajectories", g.trajectories.len()),
        BlockBody::Placeholder(p) => p.directive.clone(),
    };
    format!("{:<20} {}", mode, detail)
}
