use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use colored::Colorize;

use dd_core::config::DashboardConfig;
use dd_core::domain::form::{JobForm, VideoPayload};
use dd_core::domain::settings::Theme;
use dd_core::infra::api::{HttpJobsApi, InMemoryJobsApi, JobsApi};
use dd_core::infra::storage::Storage;
use dd_core::usecase::app_service::DashboardService;
use dd_core::usecase::job_store::RefreshOutcome;
use dd_core::usecase::submission::FormOutcome;

use crate::cli::{Args, OutputFormat, SubmitArgs, ThemeAction};
use crate::render;

/// オフライン時にデモバックエンドを進める間隔
const DEMO_ADVANCE_INTERVAL: Duration = Duration::from_secs(4);

/// コマンド実行に必要なものをまとめたもの
pub struct Context {
    pub service: DashboardService,
    pub config: DashboardConfig,
    /// --offline のときだけ Some
    pub demo: Option<Arc<InMemoryJobsApi>>,
}

impl Context {
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        let mut config = DashboardConfig::from_env().context("failed to load configuration")?;
        if let Some(url) = &args.api_base_url {
            config.api_base_url = url.trim().trim_end_matches('/').to_string();
        }

        // 設定 DB が使えなくても一覧表示はできるようにする
        let storage = Storage::open(&config.db_path).or_else(|e| {
            log::warn!("設定 DB を開けないため in-memory で続行: {e}");
            Storage::open_in_memory()
        })?;

        let (api, demo): (Arc<dyn JobsApi>, Option<Arc<InMemoryJobsApi>>) = if args.offline {
            let demo = Arc::new(InMemoryJobsApi::with_sample_jobs());
            (demo.clone(), Some(demo))
        } else {
            let http = HttpJobsApi::from_config(&config)?;
            log::debug!("API: {}", http.base_url());
            (Arc::new(http), None)
        };

        Ok(Self {
            service: DashboardService::new(api, storage),
            config,
            demo,
        })
    }

    fn theme(&self) -> Theme {
        self.service.theme().unwrap_or_else(|e| {
            log::warn!("テーマ取得に失敗: {e}");
            Theme::default()
        })
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

pub async fn list(ctx: &Context, output: OutputFormat) -> anyhow::Result<ExitCode> {
    let outcome = ctx.service.refresh().await;
    let state = ctx.service.store().snapshot();

    match output {
        OutputFormat::Json => {
            if let RefreshOutcome::Failed(message) = &outcome {
                anyhow::bail!("{message}");
            }
            println!("{}", serde_json::to_string_pretty(&state.jobs)?);
        }
        OutputFormat::Table => println!("{}", render::job_table(&state, ctx.theme())),
    }
    Ok(exit_code(!matches!(outcome, RefreshOutcome::Failed(_))))
}

pub async fn show(ctx: &Context, id: &str, output: OutputFormat) -> anyhow::Result<ExitCode> {
    match ctx.service.get_job(id).await {
        Ok(detail) => {
            match output {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&detail)?),
                OutputFormat::Table => println!("{}", render::job_detail(&detail, ctx.theme())),
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_validation() => {
            eprintln!("{}", render::field_error(&e));
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            eprintln!("{}", format!("Failed to load job: {e}").red());
            Ok(ExitCode::FAILURE)
        }
    }
}

pub async fn submit(ctx: &Context, args: SubmitArgs) -> anyhow::Result<ExitCode> {
    let video = match VideoPayload::from_path(&args.video).await {
        Ok(video) => video,
        Err(e) => {
            eprintln!("{}", render::field_error(&e));
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut controller = ctx.service.submission_controller();
    controller.set_form(JobForm {
        title: args.title,
        source_language: args.source,
        target_language: args.target,
        video: Some(video),
    });

    let theme = ctx.theme();
    let ok = match controller.on_submit().await {
        FormOutcome::Created(created) => {
            println!(
                "{} {} ({})",
                "Job submitted:".green(),
                created.id,
                render::status_badge(created.status, theme).to_string().trim_end()
            );
            true
        }
        FormOutcome::Invalid(e) => {
            eprintln!("{}", render::field_error(&e));
            return Ok(ExitCode::FAILURE);
        }
        FormOutcome::Failed(_) => false,
        FormOutcome::Busy => {
            eprintln!("{}", "A submission is already in progress.".yellow());
            false
        }
    };

    // 失敗時はまだ一覧を取得していないので、表示前に取得する
    if !ok {
        ctx.service.refresh().await;
    }

    // submit_error はここでインライン表示される
    println!();
    println!("{}", render::job_table(&ctx.service.store().snapshot(), theme));
    Ok(exit_code(ok))
}

pub async fn watch(ctx: &Context, interval_secs: Option<u64>) -> anyhow::Result<ExitCode> {
    let interval = match interval_secs {
        Some(secs) => Duration::from_secs(secs),
        None => ctx.config.poll_interval.context(
            "polling is disabled (DUBDESK_POLL_INTERVAL_SECS=0); pass --interval to watch",
        )?,
    };
    let theme = ctx.theme();
    let store = ctx.service.store();
    let mut changes = store.subscribe();

    // 初回の取得もポーラーが行う
    let poller = ctx.service.start_poller(interval);
    let demo_task = ctx.demo.clone().map(|demo| {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(DEMO_ADVANCE_INTERVAL);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                demo.advance();
            }
        })
    });
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = changes.borrow_and_update().clone();
                // 画面をクリアして再描画
                print!("\x1b[2J\x1b[H");
                println!("{}", render::job_table(&state, theme));
                println!("{}", format!("api: {} · Ctrl-C to quit", store.api_name()).dimmed());
                std::io::stdout().flush()?;
            }
        }
    }

    poller.stop().await;
    if let Some(task) = demo_task {
        task.abort();
    }
    println!();
    println!("{}", render::stats(&ctx.service.metrics()));
    Ok(ExitCode::SUCCESS)
}

pub fn theme(ctx: &Context, action: Option<ThemeAction>) -> anyhow::Result<ExitCode> {
    let theme = match action {
        None => ctx.service.theme()?,
        Some(ThemeAction::Light) => {
            ctx.service.set_theme(Theme::Light)?;
            Theme::Light
        }
        Some(ThemeAction::Dark) => {
            ctx.service.set_theme(Theme::Dark)?;
            Theme::Dark
        }
        Some(ThemeAction::Toggle) => ctx.service.toggle_theme()?,
    };
    println!("{theme}");
    Ok(ExitCode::SUCCESS)
}

pub async fn stats(ctx: &Context) -> anyhow::Result<ExitCode> {
    let outcome = ctx.service.refresh().await;
    if let RefreshOutcome::Failed(message) = &outcome {
        eprintln!("{}", message.red());
    }
    println!("{}", render::stats(&ctx.service.metrics()));
    Ok(exit_code(!matches!(outcome, RefreshOutcome::Failed(_))))
}
