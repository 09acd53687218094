//! gashapon - terminal front-end for the task capsule machine.
//!
//! Reads one command per line from stdin and renders controller events to
//! stdout. Logs go to stderr.
//!
//! Commands: `draw` (扭一下), `swap` (换一颗蛋), `done` (我去做了),
//! `status`, `quit`.

use std::sync::Arc;

use little_things::config::Config;
use little_things::controller::{
    CommandOutcome, ControllerEvent, InteractionController, InteractionState, Snapshot, Timings,
};
use little_things::counter::WeeklyCounter;
use little_things::source::{EndpointSource, GeneratorSource, LocalPool, TaskSource};
use little_things::storage::{FileKvStore, InMemoryKvStore, KvStore};
use little_things::task::Task;
use little_things::theme;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async_main())
}

async fn async_main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "little_things=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    let pool = Arc::new(LocalPool::load(config.task_pool_file.as_deref())?);

    let source: Arc<dyn TaskSource> = match &config.task_endpoint {
        Some(url) => {
            info!("Fetching tasks from {}", url);
            Arc::new(EndpointSource::new(
                url.clone(),
                config.fetch_timeout,
                pool,
            )?)
        }
        None => Arc::new(GeneratorSource::from_config(&config.llm, pool)),
    };

    let store: Arc<dyn KvStore> = match FileKvStore::open(&config.data_dir).await {
        Ok(store) => {
            info!("Week counts stored in {}", store.path().display());
            Arc::new(store)
        }
        Err(e) => {
            warn!("Failed to open {}: {}", config.data_dir.display(), e);
            Arc::new(InMemoryKvStore::new())
        }
    };
    if !store.is_persistent() {
        warn!("Week counts are kept in memory and will reset when gashapon exits");
    }

    let controller =
        InteractionController::spawn(source, WeeklyCounter::new(store), Timings::default()).await;
    let mut events = controller.subscribe();

    print_banner(&controller.snapshot().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => break,
                };
                match line.trim() {
                    "" => {}
                    "draw" | "d" => report("扭一下", controller.draw().await),
                    "swap" | "s" => report("换一颗蛋", controller.swap().await),
                    "done" | "c" => report("我去做了", controller.complete().await),
                    "status" => print_status(&controller.snapshot().await),
                    "quit" | "q" | "exit" => break,
                    other => println!("不认识的指令：{}（draw / swap / done / status / quit）", other),
                }
            }
            event = events.recv() => match event {
                Ok(event) => render(&event),
                Err(RecvError::Lagged(skipped)) => warn!("Skipped {} controller events", skipped),
                Err(RecvError::Closed) => break,
            },
        }
    }

    Ok(())
}

fn print_banner(snapshot: &Snapshot) {
    println!("小事扭蛋机");
    println!("本周完成：{} 次", snapshot.week_count);
    println!("输入 draw 扭一下。");
}

fn print_status(snapshot: &Snapshot) {
    println!("状态：{}", snapshot.state);
    if let Some(task) = &snapshot.task {
        print_task(task);
    }
    println!("本周完成：{} 次", snapshot.week_count);
}

fn print_task(task: &Task) {
    let theme = theme::resolve(&task.category);
    println!(
        "[{} · {} · {}] {}",
        task.category, theme.label, theme.accessory, task.text
    );
    println!("  大约 {} 分钟。{}", task.minutes, task.soft);
}

fn report(action: &str, outcome: CommandOutcome) {
    if outcome == CommandOutcome::Ignored {
        println!("（现在不能{}）", action);
    }
}

fn render(event: &ControllerEvent) {
    match event {
        ControllerEvent::StateChanged { state, task } => match state {
            InteractionState::Idle => println!("扭蛋机在等你。"),
            InteractionState::Drawing => println!("咔哒咔哒……"),
            InteractionState::Revealed => {
                if let Some(task) = task {
                    let theme = theme::resolve(&task.category);
                    println!("滚出来一颗 {} 色的蛋。", theme.egg_color);
                }
            }
            InteractionState::Hatching => println!("蛋裂开了……"),
            InteractionState::TaskShown => {
                if let Some(task) = task {
                    print_task(task);
                }
                println!("输入 done（我去做了）或 swap（换一颗蛋）。");
            }
            InteractionState::Completed => {}
        },
        ControllerEvent::FeedbackShown { message } => println!("✿ {}", message),
        ControllerEvent::FeedbackCleared => {}
        ControllerEvent::WeekCountChanged { count } => println!("本周完成：{} 次", count),
    }
}
