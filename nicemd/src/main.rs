use clap::Parser;
use nicemd_lib::{convert, ThemeStore};
use std::fs;
use std::path::PathBuf;

const NICEMD_INTRO: &str = r#"
        _   ___           __  ______
       / | / (_)_______  /  |/  / __ \
      /  |/ / / ___/ _ \/ /|_/ / / / /
     / /|  / / /__/  __/ /  / / /_/ /
    /_/ |_/_/\___/\___/_/  /_/_____/

    Welcome to NiceMD - Markdown to rich-content HTML!
"#;

#[derive(Parser)]
#[command(name = "NiceMD")]
#[command(about = "Convert Markdown to themed, style-inlined HTML")]
struct Args {
    /// Input Markdown file.
    input: Option<String>,

    /// Output HTML file. Prints to stdout when omitted.
    #[arg(short, long)]
    output: Option<String>,

    /// Theme name. Uses the first available theme when omitted.
    #[arg(short, long)]
    theme: Option<String>,

    /// Directory containing theme JSON files.
    #[arg(long, default_value = "theme")]
    theme_dir: PathBuf,

    /// List available themes and exit.
    #[arg(long)]
    list_themes: bool,
}

fn main() {
    env_logger::init();

    let args: Args = Args::parse();
    let themes = ThemeStore::new(&args.theme_dir);

    if args.list_themes {
        match themes.list_theme_names() {
            Ok(names) => {
                for name in names {
                    println!("{}", name);
                }
            }
            Err(e) => {
                eprintln!("Error listing themes: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    println!("{}", NICEMD_INTRO);

    let Some(input) = args.input else {
        eprintln!("Error: no input file given");
        std::process::exit(1);
    };

    let markdown = match fs::read_to_string(&input) {
        Ok(markdown) => {
            println!("Successfully read the Markdown file.");
            markdown
        }
        Err(e) => {
            eprintln!("Error reading Markdown file: {}", e);
            std::process::exit(1);
        }
    };

    let conversion = match convert(&markdown, args.theme.as_deref(), &themes) {
        Ok(conversion) => conversion,
        Err(e) => {
            eprintln!("Error converting Markdown: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("used theme '{}'", conversion.theme);

    match args.output {
        Some(path) => {
            if let Err(e) = fs::write(&path, &conversion.html) {
                eprintln!("Error writing output file: {}", e);
                std::process::exit(1);
            }
            println!("Wrote {}", path);
        }
        None => println!("{}", conversion.html),
    }
}
