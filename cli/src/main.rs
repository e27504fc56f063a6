mod highlighter;
mod session;

use clap::Parser;
use highlighter::{Highlighter, ParenValidator};
use miette::Result;
use reckon::EngineOptions;
use reedline::{
    DefaultCompleter, DefaultPrompt, DefaultPromptSegment, DescriptionMode, EditCommand, Emacs,
    IdeMenu, KeyCode, KeyModifiers, Keybindings, MenuBuilder, Reedline, ReedlineEvent,
    ReedlineMenu, Signal, default_emacs_keybindings,
};
use session::Session;
use std::io::BufRead;
use std::io::BufReader;

/// Reckon - a reactive formula engine
#[derive(Parser, Debug)]
#[command(name = "reckon")]
#[command(about = "Evaluate and edit reactive formulas", long_about = None)]
struct Args {
    /// Seed for `random` and `roll`, for repeatable sessions
    #[arg(long)]
    seed: Option<u64>,

    /// Print the resolved tokens of evaluated expressions (for debugging)
    #[arg(long)]
    debug_tokens: bool,

    /// Expression to evaluate (if not provided, reads commands from stdin)
    expression: Option<String>,
}

const COMMANDS: &[&str] = &[
    "help", "group", "let", "show", "demand", "mv", "rename", "rm", "deps", "random", "roll",
    "ceil", "floor", "round", "max", "min", "sqrt",
];

fn add_menu_keybindings(keybindings: &mut Keybindings) {
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu("completion_menu".to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );
    keybindings.add_binding(
        KeyModifiers::ALT,
        KeyCode::Enter,
        ReedlineEvent::Edit(vec![EditCommand::InsertNewline]),
    );
}

fn setup_reedline() -> (Reedline, DefaultPrompt) {
    let commands: Vec<String> = COMMANDS.iter().map(|c| c.to_string()).collect();

    let completer = Box::new({
        let mut completions = DefaultCompleter::with_inclusions(&['-', '_']);
        completions.insert(commands);
        completions
    });

    // Use the interactive menu to select options from the completer
    let ide_menu = IdeMenu::default()
        .with_name("completion_menu")
        .with_min_completion_width(0)
        .with_max_completion_width(50)
        .with_max_completion_height(u16::MAX)
        .with_padding(0)
        .with_cursor_offset(0)
        .with_description_mode(DescriptionMode::PreferRight)
        .with_min_description_width(0)
        .with_max_description_width(50)
        .with_description_offset(1)
        .with_correct_cursor_pos(false);

    let completion_menu = Box::new(ide_menu);

    let mut keybindings = default_emacs_keybindings();
    add_menu_keybindings(&mut keybindings);

    let edit_mode = Box::new(Emacs::new(keybindings));

    let line_editor = Reedline::create()
        .with_highlighter(Box::new(Highlighter::new()))
        .with_validator(Box::new(ParenValidator))
        .with_completer(completer)
        .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
        .with_edit_mode(edit_mode);

    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("reckon".to_string()),
        DefaultPromptSegment::Empty,
    );

    (line_editor, prompt)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging subscriber
    use tracing_subscriber::{EnvFilter, fmt};

    // Use RUST_LOG to control the log level; default to WARN
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let options = EngineOptions {
        seed: args.seed,
        ..EngineOptions::default()
    };
    let mut session = Session::new(options, args.debug_tokens);

    // Check if we have a direct expression argument
    if let Some(expr) = args.expression {
        session.run_line(&expr);
        return Ok(());
    }

    // Otherwise, check if we're in interactive or pipe mode
    let is_interactive = atty::is(atty::Stream::Stdin);

    if is_interactive {
        let (mut line_editor, prompt) = setup_reedline();

        println!("Reckon REPL - type `help` for commands (Ctrl+D or Ctrl+C to exit)");

        loop {
            let sig = match line_editor.read_line(&prompt) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Reedline error: {e}");
                    return Ok(());
                }
            };

            match sig {
                Signal::Success(buffer) => session.run_line(&buffer),
                Signal::CtrlD | Signal::CtrlC => {
                    println!("\nGoodbye!");
                    return Ok(());
                }
            }
        }
    } else {
        // Pipe/stdin mode: one command per line
        let stdin = std::io::stdin();
        let reader = BufReader::new(stdin.lock());

        for line in reader.lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    eprintln!("Error reading line from stdin: {}", e);
                    return Ok(());
                }
            };
            session.run_line(&line);
        }
    }

    Ok(())
}
