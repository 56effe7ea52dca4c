//! Pixgraph CLI - Node-graph Image Processing
//!
//! Builds small graphs from command-line flags and evaluates them.
//! Set `RUST_LOG=debug` to see every node as it is evaluated.

use anyhow::{anyhow, bail, Context, Result};
use pixgraph::prelude::*;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("pixgraph");

    if args.len() < 2 {
        print_usage(program);
        return;
    }

    let outcome = match args[1].as_str() {
        "kinds" => list_kinds(args[2..].iter().any(|a| a == "--json")),
        "process" => process_image(&args[2..]),
        "blend" => blend_images(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage(program);
            Ok(())
        }
        other => Err(anyhow!("Unknown command: {}", other)),
    };

    if let Err(e) = outcome {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

fn print_usage(program: &str) {
    println!("🎨 Pixgraph v{}", pixgraph::VERSION);
    println!();
    println!("Usage: {} <command> [options]", program);
    println!();
    println!("Commands:");
    println!("  kinds [--json]                 List node kinds");
    println!("  process <in> <out> [options]   Run a chain of transforms");
    println!("  blend <a> <b> <out> [--alpha A]  Mix two images");
    println!("  help                           Show this help message");
    println!();
    println!("Process options (applied in this order):");
    println!("  --brightness <N>   Offset in [-100, 100]");
    println!("  --contrast <F>     Factor in [0, 3]");
    println!("  --blur <K>         Positive odd kernel size, at most 255");
    println!("  --noise <A>        Amount in [0, 1]");
    println!("  --edges            Edge detection");
    println!("  --kernel <rows>    Convolution, e.g. \"0 -1 0; -1 5 -1; 0 -1 0\"");
}

fn list_kinds(json: bool) -> Result<()> {
    if json {
        let kinds: Vec<_> = NodeKind::all()
            .iter()
            .map(|kind| {
                serde_json::json!({
                    "id": kind,
                    "name": kind.display_name(),
                    "description": kind.description(),
                    "inputs": kind.input_count(),
                    "output": kind.produces_output(),
                    "parameters": kind.parameter_names(),
                    "default": Parameters::default_for(*kind),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&kinds)?);
        return Ok(());
    }

    println!("Node kinds ({} total):", NodeKind::all().len());
    println!();
    for kind in NodeKind::all() {
        println!("  • {:<15} {}", kind.id(), kind.description());
        for name in kind.parameter_names() {
            let default = Parameters::default_for(*kind)
                .get(name)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "unset".to_string());
            println!("      {} = {}", name, default);
        }
    }
    Ok(())
}

/// One `--flag value` step of the process chain.
fn parse_step(flag: &str, value: Option<&String>) -> Result<(NodeKind, Option<(&'static str, Value)>)> {
    let value = || value.ok_or_else(|| anyhow!("{} needs a value", flag));
    let step = match flag {
        "--brightness" => (NodeKind::Brightness, Some(("offset", Value::Integer(value()?.parse()?)))),
        "--contrast" => (NodeKind::Contrast, Some(("factor", Value::Float(value()?.parse()?)))),
        "--blur" => (NodeKind::Blur, Some(("kernel_size", Value::Integer(value()?.parse()?)))),
        "--noise" => (NodeKind::Noise, Some(("amount", Value::Float(value()?.parse()?)))),
        "--kernel" => (NodeKind::Convolution, Some(("kernel", Value::Kernel(parse_kernel(value()?)?)))),
        "--edges" => (NodeKind::EdgeDetection, None),
        other => bail!("Unknown option: {}", other),
    };
    Ok(step)
}

fn parse_kernel(text: &str) -> Result<Kernel> {
    let rows = text
        .split(';')
        .map(|row| {
            row.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .map(|s| s.parse::<f32>())
                .collect::<Result<Vec<f32>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()
        .context("kernel weights must be numbers")?;
    Ok(Kernel::from_rows(&rows)?)
}

fn process_image(args: &[String]) -> Result<()> {
    let [input, output_path, rest @ ..] = args else {
        bail!("Usage: process <input> <output> [options]");
    };

    let mut graph = ProcessingGraph::new();
    let load = graph.add_node(NodeKind::Load, "input");
    graph.set_parameter(load, "path", input.as_str())?;

    let mut previous = load;
    let mut i = 0;
    while i < rest.len() {
        let (kind, parameter) = parse_step(&rest[i], rest.get(i + 1))?;
        i += if parameter.is_some() { 2 } else { 1 };

        let node = graph.add_node(kind, "");
        if let Some((name, value)) = parameter {
            graph.set_parameter(node, name, value)?;
        }
        graph.connect_nodes(previous, node)?;
        previous = node;
    }

    let output = graph.add_node(NodeKind::Output, "output");
    graph.set_parameter(output, "path", output_path.as_str())?;
    graph.connect_nodes(previous, output)?;

    run_and_save(&graph, output)
}

fn blend_images(args: &[String]) -> Result<()> {
    let [a, b, output_path, rest @ ..] = args else {
        bail!("Usage: blend <a> <b> <output> [--alpha A]");
    };

    let mut graph = ProcessingGraph::new();
    let base = graph.add_node(NodeKind::Load, "base");
    let overlay = graph.add_node(NodeKind::Load, "overlay");
    let blend = graph.add_node(NodeKind::Blend, "");
    let output = graph.add_node(NodeKind::Output, "output");
    graph.set_parameter(base, "path", a.as_str())?;
    graph.set_parameter(overlay, "path", b.as_str())?;
    graph.set_parameter(output, "path", output_path.as_str())?;

    match rest {
        [] => {}
        [flag, alpha] if flag == "--alpha" => {
            let alpha: f64 = alpha.parse().context("alpha must be a number")?;
            graph.set_parameter(blend, "alpha", alpha)?;
        }
        _ => bail!("Unknown options: {}", rest.join(" ")),
    }

    graph.connect_nodes(base, blend)?;
    graph.connect_nodes(overlay, blend)?;
    graph.connect_nodes(blend, output)?;

    run_and_save(&graph, output)
}

fn run_and_save(graph: &ProcessingGraph, output: NodeId) -> Result<()> {
    println!("🔍 Validating pipeline...");
    let report = ValidationPipeline::default().validate(graph);
    for warning in &report.warnings {
        println!("⚠️  {}", warning.message);
    }
    if !report.success {
        for line in report.detailed_errors() {
            eprintln!("   {}", line);
        }
        bail!("{}", report.summary());
    }

    let options = EvalOptions::new()
        .with_write_outputs(true)
        .with_progress(|update| match update {
            ProgressUpdate::NodeStarted { kind, node_id, .. } => {
                println!("   • Running: {} ({})", kind, node_id);
            }
            ProgressUpdate::ParameterCoerced { warning } => {
                println!("⚠️  {}", warning);
            }
            ProgressUpdate::Completed {
                total_duration_ms,
                nodes_evaluated,
                ..
            } => {
                println!("✅ Complete in {}ms ({} nodes)", total_duration_ms, nodes_evaluated);
            }
            _ => {}
        });

    let evaluation = ExecutionEngine::new()
        .evaluate_with(graph, output, &options)
        .context("evaluation failed")?;

    let (w, h) = evaluation.image.dimensions();
    let path = graph
        .get_node(output)?
        .get_parameter("path")
        .map(|v| v.to_string())
        .unwrap_or_default();
    println!("🎉 {}x{} image saved to {}", w, h, path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kernel_rows() {
        let kernel = parse_kernel("0 -1 0; -1 5 -1; 0,-1,0").unwrap();
        assert_eq!((kernel.rows(), kernel.cols()), (3, 3));
        assert_eq!(kernel.weight(1, 1), 5.0);
        assert_eq!(kernel.weight(2, 1), -1.0);
    }

    #[test]
    fn test_parse_kernel_rejects_ragged_and_non_numeric() {
        assert!(parse_kernel("1 2; 3").is_err());
        let err = parse_kernel("1 x; 3 4").unwrap_err();
        assert!(format!("{:#}", err).contains("kernel weights must be numbers"));
    }

    #[test]
    fn test_parse_step() {
        let value = "50".to_string();
        let (kind, parameter) = parse_step("--brightness", Some(&value)).unwrap();
        assert_eq!(kind, NodeKind::Brightness);
        assert_eq!(parameter, Some(("offset", Value::Integer(50))));

        let (kind, parameter) = parse_step("--edges", Some(&value)).unwrap();
        assert_eq!(kind, NodeKind::EdgeDetection);
        assert!(parameter.is_none());

        assert!(parse_step("--blur", None).is_err());
        assert!(parse_step("--contrast", Some(&"lots".to_string())).is_err());
        assert!(parse_step("--sharpen", Some(&value)).is_err());
    }
}
