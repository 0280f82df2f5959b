use std::fmt::Display;
use std::process;

use plotters::prelude::*;

use sim_lib::error::{SimulatorError, SimulatorResult};
use sim_lib::logging;
use sim_lib::memory::cache::CachePolicy;
use sim_lib::run_wrapper::{fetch_operations, simulate};

const BLOCK_SIZE: usize = 32;

fn main() {
    logging::init(false);

    let param_tokens: Vec<String> = std::env::args().collect();
    let Some(trace_path) = param_tokens.get(1) else {
        eprintln!("Error: You should specify exactly one trace file");
        process::exit(1);
    };

    if let Err(e) = run_eval(trace_path) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn plot_error(e: impl Display) -> SimulatorError {
    SimulatorError::PlotError(e.to_string())
}

fn run_eval(trace_path: &str) -> SimulatorResult<()> {
    let operations = fetch_operations(trace_path)?;

    // Plot line series for each associativity
    // For a fixed associativity, vary the L1 size from 1KB to 1MB
    // Performance metric: L1 miss rate, no L2
    let log_sizes: Vec<u32> = (10..=20).collect();
    let assocs = [1, 2, 4, 8];

    let mut data: Vec<Vec<(u32, f64)>> = vec![vec![]; assocs.len()];
    let mut y_max: f64 = 0.;
    for (i, assoc) in assocs.iter().enumerate() {
        for &log_size in &log_sizes {
            let policy = CachePolicy::make(1 << log_size, BLOCK_SIZE, *assoc);
            let miss_rate = simulate(&operations, policy, None)?.l1_miss_rate();
            data[i].push((log_size, miss_rate));
            y_max = y_max.max(miss_rate);
        }
    }

    // Plot the data
    let trace_base_name =
        trace_path.rsplit('/').next().unwrap_or(trace_path);
    let plot_title = format!("L1 miss rate: {}", trace_base_name);
    std::fs::create_dir_all("eval")?;
    let output_path = format!("eval/plot_{}.svg", trace_base_name);

    let root =
        SVGBackend::new(output_path.as_str(), (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let mut ctx = ChartBuilder::on(&root)
        .caption(plot_title.as_str(), ("sans-serif", 40).into_font())
        .margin(5)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(10u32..20u32, 0.0..(y_max * 1.1).max(0.01))
        .map_err(plot_error)?;
    ctx.configure_mesh()
        .x_desc("log2(L1 size)")
        .y_desc("Miss rate")
        .draw()
        .map_err(plot_error)?;

    for (i, assoc) in assocs.iter().enumerate() {
        let series = data[i].iter().copied();
        let label = format!("{}-way", assoc);
        let color = Palette99::pick(i).to_rgba();
        ctx.draw_series(LineSeries::new(series, color))
            .map_err(plot_error)?
            .label(label)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color)
            });
    }

    ctx.configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(plot_error)?;
    root.present().map_err(plot_error)?;

    eprintln!("Wrote {}", output_path);

    Ok(())
}
