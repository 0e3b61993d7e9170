use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use crate::graph::Graph;
use crate::layout::{ColaLayout, DagreLayout, ForceLayout, Layout};
use crate::model::GraphModel;
use crate::svg::render_svg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LayoutKind {
    Force,
    Dagre,
    Cola,
}

#[derive(Debug, Parser)]
#[command(
    name = "topograph",
    about = "Lay out a topology graph model and render it to SVG."
)]
pub struct RenderArgs {
    /// Path to the input graph model (JSON). Use '-' to read from stdin.
    #[arg(short = 'i', long = "input")]
    input: Option<String>,

    /// Path to the output file. Use '-' to write to stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Layout engine to run before rendering.
    #[arg(short = 'l', long = "layout", value_enum, default_value_t = LayoutKind::Force)]
    layout: LayoutKind,

    /// Background color for the rendered graph.
    #[arg(short = 'b', long = "background-color", default_value = "white")]
    background_color: String,

    /// Suppress informational output.
    #[arg(short = 'q', long = "quiet", action = ArgAction::SetTrue)]
    quiet: bool,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let source = match args.input.as_deref() {
        None | Some("-") => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read graph model from stdin")?;
            buffer
        }
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read graph model '{path}'"))?,
    };

    let model = GraphModel::parse(&source)?;
    let mut graph = Graph::from_model(&model)?;

    let mut layout: Box<dyn Layout> = match args.layout {
        LayoutKind::Force => Box::new(ForceLayout::new(&graph)),
        LayoutKind::Dagre => Box::new(DagreLayout::new()),
        LayoutKind::Cola => Box::new(ColaLayout::new()),
    };
    layout.layout(&mut graph)?;
    layout.destroy();

    let svg = render_svg(&graph, &args.background_color)?;

    match args.output.as_deref() {
        None | Some("-") => {
            io::stdout()
                .write_all(svg.as_bytes())
                .context("failed to write SVG to stdout")?;
        }
        Some(path) => {
            let path = PathBuf::from(path);
            fs::write(&path, &svg)
                .with_context(|| format!("failed to write SVG to '{}'", path.display()))?;
            if !args.quiet {
                println!(
                    "rendered {} nodes and {} edges to {}",
                    graph.node_count(),
                    graph.edges().len(),
                    path.display()
                );
            }
        }
    }

    Ok(())
}
