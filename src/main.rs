use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use snake_energy::config::{EnergyDefaults, DEFAULT_CONFIG_FILE};
use snake_energy::{
    text, Boundary, Coefficients, EnergyConfig, EnergyParams, InternalEnergy, Inversion,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Residuals above this value are reported as a warning.
const RESIDUAL_WARNING: f64 = 1e-8;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = "Builds the inverse of the regularized internal-energy matrix of an active contour."
)]
struct Args {
    /// Number of control points of the curve.
    #[arg(short = 'n', long)]
    points: usize,

    /// Tension weight (resistance to stretching).
    #[arg(long, allow_negative_numbers = true)]
    alpha: Option<f64>,

    /// Rigidity weight (resistance to bending).
    #[arg(long, allow_negative_numbers = true)]
    beta: Option<f64>,

    /// Regularization added to the diagonal.
    #[arg(long, allow_negative_numbers = true)]
    gamma: Option<f64>,

    /// Topology of the curve.
    #[arg(long, value_enum, default_value_t = BoundaryArg::Closed)]
    boundary: BoundaryArg,

    /// Inversion strategy.
    #[arg(long, value_enum, default_value_t = InversionArg::Dense)]
    inversion: InversionArg,

    /// Config file with default `alpha`, `beta` and `gamma` values.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Optional path for the JSON report with the inverse matrix.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the inverse matrix to the terminal.
    #[arg(long)]
    print: bool,
}

#[derive(Debug, Clone, ValueEnum)]
enum BoundaryArg {
    /// Closed curve, the last point connects back to the first.
    Closed,
    /// Open curve with free ends.
    Open,
}

#[derive(Debug, Clone, ValueEnum)]
enum InversionArg {
    /// LU decomposition of the dense matrix.
    Dense,
    /// FFT diagonalization (closed curves only).
    Circulant,
}

impl From<BoundaryArg> for Boundary {
    fn from(arg: BoundaryArg) -> Self {
        match arg {
            BoundaryArg::Closed => Boundary::Closed,
            BoundaryArg::Open => Boundary::Open,
        }
    }
}

impl From<InversionArg> for Inversion {
    fn from(arg: InversionArg) -> Self {
        match arg {
            InversionArg::Dense => Inversion::Dense,
            InversionArg::Circulant => Inversion::Circulant,
        }
    }
}

#[derive(Serialize)]
struct MatrixReport<'a> {
    params: &'a EnergyParams,
    num_points: usize,
    boundary: Boundary,
    inversion: Inversion,
    coefficients: &'a Coefficients,
    identity_residual: f64,
    inverse: Vec<Vec<f64>>,
}

impl<'a> MatrixReport<'a> {
    fn new(energy: &'a InternalEnergy, identity_residual: f64) -> Self {
        let config = energy.config();
        let inverse: Vec<Vec<f64>> = energy
            .inverse()
            .row_iter()
            .map(|row| row.iter().copied().collect::<Vec<f64>>())
            .collect();

        Self {
            params: &config.params,
            num_points: config.num_points,
            boundary: config.boundary,
            inversion: config.inversion,
            coefficients: energy.coefficients(),
            identity_residual,
            inverse,
        }
    }
}

fn print_warnings(config: &EnergyConfig) {
    let params = &config.params;
    if params.alpha < 0.0 || params.beta < 0.0 {
        println!(
            "{}: Negative tension or rigidity makes the contour gain energy when it stretches or bends.",
            text::warning("Warning")
        );
    }
    if config.num_points < 5 && config.boundary == Boundary::Closed {
        println!(
            "{}: With fewer than 5 points the wrapped diagonals overlap and their coefficients add up.",
            text::warning("Warning")
        );
    }
}

fn write_report(path: &Path, report: &MatrixReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }
    let json = serde_json::to_string_pretty(report).context("Failed to serialize the report")?;
    fs::write(path, json).with_context(|| format!("Failed to write report: {:?}", path))?;
    Ok(())
}

fn main() -> Result<()> {
    let start_time = Instant::now();
    let args = Args::parse();

    println!(
        "{}",
        text::banner(
            "Snake Matrix",
            env!("CARGO_PKG_VERSION"),
            "Tool for building the inverse internal-energy matrix of active contours."
        )
    );

    let defaults = EnergyDefaults::load(&args.config);
    let params = defaults.resolve(args.alpha, args.beta, args.gamma);
    let config = EnergyConfig::new(params, args.points)
        .with_boundary(args.boundary.into())
        .with_inversion(args.inversion.into());

    println!("{} Configuration:", text::bold("Matrix"));
    println!("{}", text::field("Points", config.num_points));
    println!("{}", text::field("Alpha", params.alpha));
    println!("{}", text::field("Beta", params.beta));
    println!("{}", text::field("Gamma", params.gamma));
    println!("{}", text::field("Boundary", config.boundary));
    println!("{}", text::field("Inversion", config.inversion));
    if args.config.exists() {
        println!("{}", text::field("Config File", args.config.display()));
    }
    println!("{}\n", text::double_rule());

    print_warnings(&config);

    let energy = match InternalEnergy::compute(config) {
        Ok(energy) => energy,
        Err(err) => {
            eprintln!("{} {}", text::cross_icon(), text::error(err.to_string()));
            if err.is_singular() {
                eprintln!(
                    "  {}",
                    text::light("A closed curve needs a positive gamma, try --gamma 1.0")
                );
            }
            return Err(err).context("Failed to build the internal-energy matrix");
        }
    };

    let coefficients = energy.coefficients();
    println!(
        "{} Coefficients r = {}, q = {}, p = {}",
        text::check_icon(),
        coefficients.r,
        coefficients.q,
        coefficients.p
    );

    let residual = energy.identity_residual();
    if residual <= RESIDUAL_WARNING {
        println!(
            "{} Identity residual: {}",
            text::check_icon(),
            text::success(format!("{:.3e}", residual))
        );
    } else {
        println!(
            "{}: Identity residual {:.3e} exceeds {:.0e}, the matrix is ill-conditioned.",
            text::warning("Warning"),
            residual,
            RESIDUAL_WARNING
        );
    }

    if args.print {
        println!("\n{}", text::bold("Inverse matrix:"));
        println!("{}", text::format_matrix(energy.inverse(), 6));
    }

    if let Some(output) = &args.output {
        write_report(output, &MatrixReport::new(&energy, residual))?;
        println!("{} Report saved to {}", text::check_icon(), output.display());
    }

    println!(
        "\n{} Finished in {:.2?}",
        text::success("Done."),
        start_time.elapsed()
    );
    Ok(())
}
