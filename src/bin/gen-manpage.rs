//! Man page generator for i2cbridge
//!
//! Writes `i2cbridge.1` plus one `i2cbridge-<command>.1` page per subcommand.
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]

use clap::CommandFactory;
use std::fs;
use std::path::{Path, PathBuf};

#[path = "../cli.rs"]
mod cli;

fn render(cmd: clap::Command, dir: &Path, name: &str) -> std::io::Result<PathBuf> {
    let mut buffer = Vec::new();
    clap_mangen::Man::new(cmd).render(&mut buffer)?;

    let path = dir.join(format!("{}.1", name));
    fs::write(&path, buffer)?;
    Ok(path)
}

/// Render every page into `dir`, main page first
fn render_all(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let cmd = cli::Cli::command();
    let mut pages = vec![render(cmd.clone(), dir, "i2cbridge")?];

    for sub in cmd.get_subcommands() {
        let name = format!("i2cbridge-{}", sub.get_name());
        pages.push(render(sub.clone().name(name.clone()), dir, &name)?);
    }

    Ok(pages)
}

fn main() -> std::io::Result<()> {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));

    let pages = render_all(&output_dir)?;
    println!("Man page generated at: {}", pages[0].display());
    for page in &pages[1..] {
        println!("  {}", page.display());
    }

    println!("\nTo view the man page:");
    println!("  man -l {}", pages[0].display());

    Ok(())
}
