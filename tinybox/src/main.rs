//! Entry point: parses CLI options, sets up logging, boots the display
//! thread, and runs the shell until exit (spec.md §5 startup/teardown).

use clap::Parser;

/// A fantasy microcomputer: bytecode VM, text/pixel display, flat filestore.
#[derive(Parser, Debug)]
#[command(name = "tinybox", version, about)]
struct Args {
    /// Directory backing the flat filestore.
    #[arg(long, default_value = "./fs")]
    fs_dir: String,

    /// Integer window scale factor.
    #[arg(long, default_value_t = 1)]
    scale: u32,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    log::info!("booting tinybox, fs_dir={}", args.fs_dir);
    let mut system = tinybox::system::System::new(&args.fs_dir)?;
    let display_thread = system.spawn_display_thread(args.scale);

    system.run_shell();

    log::info!("shell exited, shutting down display thread");
    system.shutdown(display_thread);
    Ok(())
}
