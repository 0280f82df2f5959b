use sim_lib::logging;
use sim_lib::memory::cache::CachePolicy;
use sim_lib::run_wrapper::{fetch_operations, simulate};

const BLOCK_SIZE: usize = 32;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init(false);

    let param_tokens: Vec<String> = std::env::args().collect();
    let trace_path =
        param_tokens.get(1).ok_or("You should specify exactly one trace file")?;
    let trace_base_name =
        trace_path.rsplit('/').next().unwrap_or(trace_path.as_str());
    let output_path = format!("eval/sweep_{}.csv", trace_base_name);

    let operations = fetch_operations(trace_path)?;

    std::fs::create_dir_all("eval")?;
    let mut writer = csv::Writer::from_path(&output_path)?;
    writer.write_record([
        "L1 size",
        "L1 assoc",
        "L2 size",
        "L2 assoc",
        "L1 miss rate",
        "L2 miss rate",
        "L1 writebacks",
        "L2 writebacks",
        "Memory traffic",
    ])?;

    // L1 sizes: 1KB to 64KB
    let l1_sizes: Vec<usize> = (10..=16).map(|bits| 1 << bits).collect();
    let l1_assocs = [1, 2, 4, 8];
    // Without L2, then with a 256KB 8-way L2
    let l2_policy = CachePolicy::make(256 * 1024, BLOCK_SIZE, 8);
    let l2_policies = [None, Some(l2_policy)];

    for l2_policy in l2_policies {
        for &l1_size in &l1_sizes {
            for l1_assoc in l1_assocs {
                let l1_policy =
                    CachePolicy::make(l1_size, BLOCK_SIZE, l1_assoc);
                let stats = simulate(&operations, l1_policy, l2_policy)?;
                let (l2_size, l2_assoc) = match l2_policy {
                    Some(policy) => (policy.cache_size, policy.associativity),
                    None => (0, 0),
                };

                writer.write_record([
                    l1_size.to_string(),
                    l1_assoc.to_string(),
                    l2_size.to_string(),
                    l2_assoc.to_string(),
                    format!("{:.4}", stats.l1_miss_rate()),
                    format!("{:.4}", stats.l2_miss_rate()),
                    stats.l1.writebacks.to_string(),
                    stats.l2.writebacks.to_string(),
                    stats.memory_traffic.to_string(),
                ])?;
            }
        }
    }

    writer.flush()?;
    eprintln!("Wrote {}", output_path);

    Ok(())
}
