//! Assembles the demo bytecode programs into flat `.bin` files under a
//! target directory, so a freshly built `tinybox` has something to `run`.

use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "demogen", about = "Generate tinybox demo programs into ./fs")]
struct Args {
    /// Directory to write the generated .bin files into.
    #[arg(short, long, default_value = "./fs")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    fs::create_dir_all(&args.output)?;

    let demos: [(&str, fn() -> Vec<u8>); 8] = [
        ("print_and_halt.bin", demogen::print_and_halt),
        ("scroll.bin", demogen::scroll_demo),
        ("countdown.bin", demogen::countdown_loop),
        ("color_change.bin", demogen::color_change),
        ("unknown_opcode.bin", demogen::unknown_opcode),
        ("pixel_then_clear.bin", demogen::pixel_then_clear),
        ("starfield.bin", demogen::starfield_demo),
        ("bouncing_ball.bin", demogen::bouncing_ball_demo),
    ];

    for (name, build) in demos {
        let path = args.output.join(name);
        let image = build();
        fs::write(&path, &image)?;
        println!("wrote {} ({} bytes)", path.display(), image.len());
    }

    let typing_path = args.output.join("typing_echo.bin");
    let typing_image = demogen::typing_echo_demo();
    fs::write(&typing_path, &typing_image)?;
    println!("wrote {} ({} bytes)", typing_path.display(), typing_image.len());

    Ok(())
}
