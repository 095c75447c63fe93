//! Replay a scripted agent run through the bridge
//!
//! ```text
//! jupyter-deepagents [--pretty] [--approve] [--thread ID] [--cwd DIR] [--focus WIDGET] SCRIPT MESSAGE...
//! ```
//!
//! SCRIPT is either a JSON array of runs (`[{"updates": [...], "error": "..."}]`)
//! or JSON lines, one update per line, forming a single run. The message is
//! streamed through the same loader, normalizer and resume path the host
//! uses; events are printed as JSON lines unless `--pretty` is given.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use futures::StreamExt;
use serde_json::Value;

use jupyter_deepagents::agent::{
    AgentModule, BridgeConfig, BridgeContext, ModuleRegistry, ScriptedAgent, ScriptedRun,
};
use jupyter_deepagents::cli::{EventRenderer, RenderMode};
use jupyter_deepagents::core::{Decision, StreamEvent};
use jupyter_deepagents::helpers::{ChatRequest, MessageContext, ResumeRequest};
use jupyter_deepagents::logging;

/// Upper bound on approve-and-resume rounds
const MAX_RESUMES: usize = 16;

struct Args {
    pretty: bool,
    approve: bool,
    thread_id: Option<String>,
    context: MessageContext,
    script: PathBuf,
    message: String,
}

fn parse_args() -> Result<Args> {
    let mut pretty = false;
    let mut approve = false;
    let mut thread_id = None;
    let mut context = MessageContext::new();
    let mut positional = Vec::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--pretty" | "-p" => pretty = true,
            "--approve" | "-a" => approve = true,
            "--thread" => thread_id = Some(args.next().context("--thread needs a value")?),
            "--cwd" => {
                context = context.with_current_directory(args.next().context("--cwd needs a value")?)
            }
            "--focus" => {
                context = context.with_focused_widget(args.next().context("--focus needs a value")?)
            }
            flag if flag.starts_with("--") => bail!("unknown flag: {}", flag),
            _ => positional.push(arg),
        }
    }

    if positional.len() < 2 {
        bail!("usage: jupyter-deepagents [--pretty] [--approve] [--thread ID] [--cwd DIR] [--focus WIDGET] SCRIPT MESSAGE...");
    }
    let script = PathBuf::from(positional.remove(0));
    Ok(Args {
        pretty,
        approve,
        thread_id,
        context,
        script,
        message: positional.join(" "),
    })
}

/// Read a script as a run list, falling back to JSON lines
fn load_script(path: &Path) -> Result<Vec<ScriptedRun>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;

    if let Ok(runs) = serde_json::from_str::<Vec<ScriptedRun>>(&raw) {
        return Ok(runs);
    }

    let updates = raw
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(i, line)| {
            serde_json::from_str::<Value>(line)
                .with_context(|| format!("Invalid JSON on line {} of {}", i + 1, path.display()))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(vec![ScriptedRun::new(updates)])
}

fn build_registry(config: &BridgeConfig, script: PathBuf) -> ModuleRegistry {
    let location = config.location();
    let export = location.variable.clone().unwrap_or_else(|| "agent".to_string());

    let mut registry = ModuleRegistry::new();
    registry.register(location.module, move || {
        let runs = load_script(&script)?;
        let agent = runs
            .into_iter()
            .fold(ScriptedAgent::new().with_backend(), ScriptedAgent::with_run);
        Ok(AgentModule::new().with_export(export.clone(), Arc::new(agent)))
    });
    registry
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = BridgeConfig::from_env();
    let _log_guard = logging::init_logging(&config.logging)?;

    let args = parse_args()?;
    let mode = if args.pretty {
        RenderMode::Pretty
    } else {
        RenderMode::JsonLines
    };
    let thread_id = args
        .thread_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    tracing::info!("Replaying {} on thread {}", args.script.display(), thread_id);

    let registry = build_registry(&config, args.script);
    let mut context = BridgeContext::new(config, registry);
    let wrapper = context.wrapper();
    let mut renderer = EventRenderer::stdout(mode);

    let request = ChatRequest::new(args.message)
        .with_context(args.context)
        .with_thread_id(thread_id.clone());
    let mut events = wrapper.stream(request);

    for round in 0..=MAX_RESUMES {
        let mut pending = None;
        while let Some(event) = events.next().await {
            renderer.render(&event)?;
            if let StreamEvent::Interrupt(data) = event {
                pending = Some(data);
            }
        }

        let Some(interrupt) = pending else {
            return Ok(());
        };
        if !args.approve {
            tracing::info!("Run paused for approval; pass --approve to continue");
            return Ok(());
        }
        if round == MAX_RESUMES {
            bail!("still interrupted after {} resumes", MAX_RESUMES);
        }

        let decisions = interrupt
            .action_requests
            .iter()
            .map(|_| Decision::approve())
            .collect();
        events = wrapper.resume(ResumeRequest::new(decisions).with_thread_id(thread_id.clone()));
    }

    Ok(())
}
