/// Terminal: plays a narrative scene in the console.
///
/// Usage: terminal --content <dir> [--thread <hero|shadow|ambition>] [--config <file.ron>] [--plan]
///
/// `--plan` prints the cinematic plan instead of playing the scene.
/// Type `quit` at any prompt to abandon the run.

use narrative_terminal::core::config::TerminalConfig;
use narrative_terminal::core::content::ContentLibrary;
use narrative_terminal::core::controller::{NarrativeController, Progress};
use narrative_terminal::core::host::{
    GameStateSink, OptionView, Presenter, PromptKind, SceneTransition,
};
use narrative_terminal::core::plan::CinematicPlan;
use narrative_terminal::schema::thread::Thread;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Console host: narration to stdout, results echoed as bracketed notes.
struct ConsoleHost;

impl Presenter for ConsoleHost {
    fn display_line(&mut self, text: &str) {
        println!("{}", text);
    }

    fn display_notice(&mut self, text: &str) {
        println!("  * {}", text);
    }

    fn display_choices(&mut self, prompt: &str, options: &[OptionView]) {
        if !prompt.is_empty() {
            println!("\n{}", prompt);
        }
        for (i, option) in options.iter().enumerate() {
            if option.description.is_empty() {
                println!("  {}. {}", i + 1, option.label);
            } else {
                println!("  {}. {} - {}", i + 1, option.label, option.description);
            }
        }
    }

    fn prompt_for_input(&mut self, _kind: PromptKind, placeholder: &str) {
        print!("[{}] > ", placeholder);
        let _ = io::stdout().flush();
    }
}

impl GameStateSink for ConsoleHost {
    fn set_selected_thread(&mut self, thread: Thread) {
        println!("  [thread: {}]", thread);
    }

    fn set_player_name(&mut self, name: &str) {
        println!("  [name: {}]", name);
    }

    fn record_scene_response(&mut self, key: &str, value: &str) {
        println!("  [{} = {}]", key, value);
    }
}

impl SceneTransition for ConsoleHost {
    fn on_sequence_complete(&mut self) {
        println!("\n--- sequence complete ---");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut content_dir = None;
    let mut thread = Thread::Hero;
    let mut config_path = None;
    let mut plan_only = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--content" if i + 1 < args.len() => {
                i += 1;
                content_dir = Some(args[i].clone());
            }
            "--thread" if i + 1 < args.len() => {
                i += 1;
                thread = Thread::parse(&args[i]).unwrap_or_else(|| {
                    eprintln!("Unknown thread '{}', using hero", args[i]);
                    Thread::Hero
                });
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--plan" => plan_only = true,
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let Some(content_dir) = content_dir else {
        eprintln!("ERROR: --content <dir> is required");
        std::process::exit(1);
    };

    let config = match config_path {
        Some(path) => TerminalConfig::load_from_ron(Path::new(&path)).unwrap_or_else(|e| {
            eprintln!("ERROR: Failed to load config: {}", e);
            std::process::exit(1);
        }),
        None => TerminalConfig::default(),
    };

    let library = ContentLibrary::load_from_dir(Path::new(&content_dir)).unwrap_or_else(|e| {
        eprintln!("ERROR: Failed to load content: {}", e);
        std::process::exit(1);
    });
    let scene = match library.require_scene_for(thread) {
        Ok(scene) => scene.clone(),
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    if plan_only {
        print_plan(&CinematicPlan::build_with(&scene, &config));
        return;
    }

    let mut controller = NarrativeController::builder()
        .config(config)
        .persona(thread)
        .build(scene);
    let mut host = ConsoleHost;

    if let Err(e) = controller.start(&mut host) {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    while !controller.is_complete() {
        let Some(Ok(line)) = lines.next() else {
            println!("\n(run abandoned)");
            return;
        };
        if line.trim() == "quit" {
            println!("(run abandoned)");
            return;
        }
        match controller.submit(&line, &mut host) {
            Ok(Progress::Ignored(kind)) | Ok(Progress::Rejected(kind)) => {
                host.prompt_for_input(kind, controller.config().placeholder_for(kind));
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("ERROR: {}", e);
                std::process::exit(1);
            }
        }
    }

    println!("\nAffinity: {}", controller.affinity().summary());
    println!("Alignment: {}", controller.affinity().dominant());
}

fn print_plan(plan: &CinematicPlan) {
    println!(
        "=== Cinematic Plan: {} beats, {} interactive ===\n",
        plan.len(),
        plan.interactive_count()
    );
    for (i, beat) in plan.beats().iter().enumerate() {
        let block = beat
            .block
            .map(|block| format!(" [block {}]", block))
            .unwrap_or_default();
        println!("{:>3}. {:?}{} ({:?})", i + 1, beat.kind, block, beat.presentation);
        for line in &beat.lines {
            println!("       {}", line);
        }
        if let Some(prompt) = &beat.prompt {
            println!("       ? {}", prompt);
        }
        for option in &beat.options {
            println!("       - {} ({})", option.label, option.id);
        }
    }
}

fn print_usage() {
    println!("Terminal: play a narrative scene in the console");
    println!();
    println!("Usage: terminal --content <dir> [--thread <hero|shadow|ambition>] [--config <file.ron>] [--plan]");
    println!();
    println!("Type 'quit' at any prompt to abandon the run.");
}
