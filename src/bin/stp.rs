//! Command-line front end over the STP engine.
//!
//! Subcommands mirror the reference tool's command set: `read_bench`,
//! `sim`, `dsd`, `bd`, `lut_resyn`, `66l`, `clear`. Flags are parsed by
//! hand rather than pulled in through a dedicated argument-parsing crate,
//! matching the style of this crate's other binaries.

#![forbid(unsafe_code)]

use std::{env, fs, process};

use stp::config::{DecConfig, DecompositionMode, Fallback, SimConfig};
use stp::matrix::ChainMethod;

fn parse_flag(args: &[String], key: &str) -> Option<String> {
    let mut it = args.iter();
    while let Some(a) = it.next() {
        if a == key {
            return it.next().cloned();
        }
    }
    None
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(env::var("RUST_LOG").unwrap_or_else(|_| "stp=warn".into()))
        .with_target(false)
        .compact()
        .init();

    let args: Vec<String> = env::args().collect();
    if let Err(e) = run(&args) {
        tracing::error!(%e, "command failed");
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(args: &[String]) -> anyhow::Result<()> {
    let cmd = args.get(1).map(String::as_str).unwrap_or("");
    let rest = &args[1.min(args.len())..];
    match cmd {
        "read_bench" => cmd_read_bench(rest),
        "sim" => cmd_sim(rest),
        "dsd" => cmd_dsd(rest),
        "bd" => cmd_bd(rest),
        "lut_resyn" => cmd_lut_resyn(rest),
        "66l" => cmd_66l(rest),
        "clear" => cmd_clear(),
        "" => Err(anyhow::anyhow!("missing command; expected one of: read_bench, sim, dsd, bd, lut_resyn, 66l, clear")),
        other => Err(anyhow::anyhow!("unknown command {other:?}")),
    }
}

/// Reads a BENCH file and prints a summary: input/output counts, then one
/// line per LUT (`name = 0xHEX ( fanins )`).
fn cmd_read_bench(args: &[String]) -> anyhow::Result<()> {
    let path = args.get(1).ok_or_else(|| anyhow::anyhow!("usage: read_bench <file>"))?;
    let text = fs::read_to_string(path)?;
    let circuit = stp::read_bench(&text)?;
    println!("inputs: {}", circuit.inputs().len());
    println!("outputs: {}", circuit.outputs().len());
    for node in circuit.nodes() {
        if node.is_pi() {
            continue;
        }
        let fanins: Vec<&str> = node.inputs().iter().rev().map(|e| circuit.node(e.target).name()).collect();
        println!("{} = 0x{} ( {} )", node.name(), node.tt_hex(), fanins.join(", "));
    }
    Ok(())
}

/// `sim <file> -l [-c] [--limit N]` — exhaustively simulates a BENCH
/// circuit, printing each output's truth-table hex. `-l` selects LUT-network
/// mode (the only network kind this engine understands). `-c` switches
/// chain multiplication to the multithreaded accelerator; requires the
/// `mt-chain` feature.
fn cmd_sim(args: &[String]) -> anyhow::Result<()> {
    let path = args.get(1).ok_or_else(|| anyhow::anyhow!("usage: sim <file> -l [-c] [--limit N]"))?;
    if !has_flag(args, "-l") && !has_flag(args, "--lut") {
        return Err(anyhow::anyhow!("sim requires -l (this engine only simulates LUT networks)"));
    }
    let cone_limit: u32 = parse_flag(args, "--limit").and_then(|s| s.parse().ok()).unwrap_or(SimConfig::default().cone_limit);
    if (has_flag(args, "-c") || has_flag(args, "--cuda")) && cfg!(not(feature = "mt-chain")) {
        eprintln!("warning: -c requested but this binary was built without the `mt-chain` feature; per-cone chains still run sequentially");
    }

    let text = fs::read_to_string(path)?;
    let mut circuit = stp::read_bench(&text)?;
    let results = stp::sim::simulate(&mut circuit, SimConfig { cone_limit }, ChainMethod::DynamicProgramming)?;
    for (id, tt) in results {
        let hex = stp::truth::bits_to_hex(&stp::truth::parse_binary(&tt)?);
        println!("{} = 0x{}", circuit.node(id).name(), hex.to_uppercase());
    }
    Ok(())
}

fn read_truth_table(args: &[String]) -> anyhow::Result<Vec<bool>> {
    if let Some(hex) = parse_flag(args, "-f") {
        let n: usize = parse_flag(args, "-n")
            .ok_or_else(|| anyhow::anyhow!("-f requires -n <num-vars> (truth table variable count)"))?
            .parse()?;
        return Ok(stp::truth::hex_to_bits(&hex, n)?);
    }
    if let Some(bin) = parse_flag(args, "-x") {
        return Ok(stp::truth::parse_binary(&bin)?);
    }
    Err(anyhow::anyhow!("expected -f HEX -n N, or -x BINARY"))
}

/// `dsd (-f HEX -n N | -x BINARY) [-s | -m] [-e]`
fn cmd_dsd(args: &[String]) -> anyhow::Result<()> {
    let bits = read_truth_table(args)?;
    let strong = has_flag(args, "-s");
    let mixed = has_flag(args, "-m");
    if strong && mixed {
        return Err(anyhow::anyhow!("-s and -m are mutually exclusive"));
    }
    let mode = if strong {
        DecompositionMode::StrongDsd
    } else if mixed {
        DecompositionMode::Mixed
    } else {
        DecompositionMode::StpDsd
    };
    let fallback = if has_flag(args, "-e") { Fallback::ShannonPlusExact2Lut } else { Fallback::None };
    let bench = stp::dec::decompose_to_bench(&bits, DecConfig { mode, fallback })?;
    print!("{bench}");
    Ok(())
}

/// `bd -f HEX -n N [-e]` — bi-decomposition.
fn cmd_bd(args: &[String]) -> anyhow::Result<()> {
    let bits = read_truth_table(args)?;
    let fallback = if has_flag(args, "-e") { Fallback::ShannonPlusExact2Lut } else { Fallback::None };
    let bench = stp::dec::decompose_to_bench(&bits, DecConfig { mode: DecompositionMode::BiDec, fallback })?;
    print!("{bench}");
    Ok(())
}

/// `lut_resyn <file> -o <out> [-e]` — re-synthesizes every `>2`-fanin LUT in
/// a netlist via bi-decomposition (the reference tool's hardcoded mode for
/// this command) and writes the rewritten netlist to `-o`.
fn cmd_lut_resyn(args: &[String]) -> anyhow::Result<()> {
    let path = args.get(1).ok_or_else(|| anyhow::anyhow!("usage: lut_resyn <file> -o <out> [-e]"))?;
    let out_path = parse_flag(args, "-o").ok_or_else(|| anyhow::anyhow!("lut_resyn requires -o <out>"))?;
    let fallback = if has_flag(args, "-e") { Fallback::ShannonPlusExact2Lut } else { Fallback::None };
    let text = fs::read_to_string(path)?;
    let rewritten = stp::dec::resyn::lut_resyn(&text, DecompositionMode::BiDec, fallback)?;
    fs::write(&out_path, rewritten)?;
    Ok(())
}

/// `66l -f HEX -n N [-d | -b]` — 6-LUT hybrid decomposition. `-d` restricts
/// to Strong DSD layering only (no bi-decomposition fallback); `-b` forces
/// bi-decomposition, skipping the Strong DSD attempt; neither flag runs the
/// default auto mode (Strong DSD, falling back to bi-decomposition).
fn cmd_66l(args: &[String]) -> anyhow::Result<()> {
    let bits = read_truth_table(args)?;
    let dsd_only = has_flag(args, "-d");
    let bidec_only = has_flag(args, "-b");
    if dsd_only && bidec_only {
        return Err(anyhow::anyhow!("-d and -b are mutually exclusive"));
    }

    let n = bits.len().trailing_zeros() as usize;
    let order: Vec<u32> = (1..=n as u32).collect();
    let mut session = stp::DecompositionSession::new();
    let root = if dsd_only {
        stp::dec::hybrid66::decompose_dsd_only(&mut session, &bits, &order)?
    } else if bidec_only {
        stp::dec::hybrid66::decompose_bidec_only(&mut session, &bits, &order, Fallback::ShannonPlusExact2Lut)?
    } else {
        stp::dec::hybrid66::decompose(&mut session, &bits, &order, Fallback::ShannonPlusExact2Lut)?
    };
    let bench = stp::dec::bench_from_root(&session, &order, root)?;
    print!("{bench}");
    Ok(())
}

/// Clears the terminal, matching the reference tool's interactive-session
/// convenience command. Unrelated to any decomposition state: this crate
/// keeps no process-global state to reset.
fn cmd_clear() -> anyhow::Result<()> {
    print!("\x1B[2J\x1B[1;1H");
    Ok(())
}
