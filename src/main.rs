use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::{rngs::SmallRng, SeedableRng};

use digit_sketch::mnist::{evaluate, load_mnist_csv, load_mnist_idx, Sample};
use digit_sketch::network::{Initializer, ModelFile};
use digit_sketch::{predict, Activation, Brush, DrawingSession, Prediction, SessionConfig};

/// Classify hand-drawn digits with a fixed feed-forward network
#[derive(Parser, Debug)]
#[command(name = "digit-sketch", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a randomly initialized model (untrained, for wiring things up)
    Init(InitArgs),
    /// Classify one image from an MNIST csv file
    Classify(ClassifyArgs),
    /// Draw from pointer samples and classify the result
    Sketch(SketchArgs),
    /// Measure model accuracy over a labelled dataset
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug)]
struct InitArgs {
    /// Where to write the model JSON
    #[arg(long)]
    out: PathBuf,

    /// Hidden layer widths, input side first
    #[arg(long = "hidden", default_values_t = [64, 32])]
    hidden: Vec<usize>,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Use N(0, std^2) weights instead of He initialization
    #[arg(long)]
    gaussian: Option<f64>,

    /// Use sigmoid instead of ReLU on hidden layers
    #[arg(long)]
    sigmoid_hidden: bool,
}

#[derive(Args, Debug)]
struct ClassifyArgs {
    #[arg(long)]
    model: PathBuf,

    /// MNIST csv: label followed by 784 pixels (0-255), no header
    #[arg(long)]
    csv: PathBuf,

    /// Zero-based row to classify
    #[arg(long, default_value_t = 0)]
    row: usize,
}

#[derive(Args, Debug)]
struct SketchArgs {
    #[arg(long)]
    model: PathBuf,

    /// Pointer samples, one `x y` per line; a blank line submits, `clear` wipes
    /// the grid. Reads stdin when omitted.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Session config JSON (canvas size, brush, refresh interval)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    canvas_size: Option<f64>,

    #[arg(long)]
    strength: Option<f64>,

    #[arg(long)]
    radius: Option<f64>,

    #[arg(long)]
    fade: Option<f64>,
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    #[arg(long)]
    model: PathBuf,

    #[arg(long, conflicts_with_all = ["images", "labels"])]
    csv: Option<PathBuf>,

    /// IDX image file (requires --labels)
    #[arg(long, requires = "labels")]
    images: Option<PathBuf>,

    #[arg(long, requires = "images")]
    labels: Option<PathBuf>,

    /// Maximum number of examples to load
    #[arg(long, default_value_t = usize::MAX)]
    limit: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("digit_sketch=info")),
        )
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        Command::Init(args) => init(args),
        Command::Classify(args) => classify(args),
        Command::Sketch(args) => sketch(args),
        Command::Evaluate(args) => run_evaluate(args),
    }
}

fn init(args: InitArgs) -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(args.seed);
    let initializer = match args.gaussian {
        Some(std_dev) => Initializer::Gaussian { mean: 0.0, std_dev },
        None => Initializer::He,
    };
    let hidden_activation = if args.sigmoid_hidden {
        Activation::Sigmoid
    } else {
        Activation::Relu
    };
    let model = initializer.build_model(&args.hidden, hidden_activation, &mut rng)?;
    ModelFile::save(&model, &args.out)
        .with_context(|| format!("writing {}", args.out.display()))?;
    println!("Wrote model {:?} to {}", model.sizes(), args.out.display());
    Ok(())
}

fn classify(args: ClassifyArgs) -> Result<()> {
    let model = ModelFile::load(&args.model)
        .with_context(|| format!("loading model {}", args.model.display()))?;
    let samples = load_mnist_csv(&args.csv, args.row.saturating_add(1))
        .with_context(|| format!("loading {}", args.csv.display()))?;
    let Some(sample) = samples.get(args.row) else {
        bail!("{} has only {} rows", args.csv.display(), samples.len());
    };

    let now = Instant::now();
    let prediction = predict(&model, &sample.grid)?;
    print!("{}", prediction.centered);
    println!("Label: {}", sample.label);
    print_prediction(&prediction);
    println!("[{}us]", now.elapsed().as_micros());
    Ok(())
}

fn sketch(args: SketchArgs) -> Result<()> {
    let model = ModelFile::load(&args.model)
        .with_context(|| format!("loading model {}", args.model.display()))?;

    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(size) = args.canvas_size {
        config.canvas_size = size;
    }
    config.brush = Brush::new(
        args.strength.unwrap_or(config.brush.strength),
        args.radius.unwrap_or(config.brush.radius),
        args.fade.unwrap_or(config.brush.fade),
    );

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let mut session = DrawingSession::new(&config);
    let mut pending = false;
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }
        if line.is_empty() {
            if pending {
                show_sketch(&session.submit(&model)?)?;
                pending = false;
            }
            continue;
        }
        if line == "clear" {
            session.clear();
            pending = false;
            continue;
        }
        let (x, y) = parse_point(line).with_context(|| format!("line {}", number + 1))?;
        session.stroke(x, y);
        pending = true;
    }
    if pending {
        show_sketch(&session.submit(&model)?)?;
    }
    Ok(())
}

fn parse_point(line: &str) -> Result<(f64, f64)> {
    let mut fields = line.split(|c: char| c.is_whitespace() || c == ',').filter(|f| !f.is_empty());
    match (fields.next(), fields.next(), fields.next()) {
        (Some(x), Some(y), None) => Ok((x.parse()?, y.parse()?)),
        _ => bail!("expected `x y`, got {:?}", line),
    }
}

fn show_sketch(prediction: &Prediction) -> Result<()> {
    print!("{}", prediction.centered);
    print_prediction(prediction);
    println!();
    io::stdout().flush()?;
    Ok(())
}

fn print_prediction(prediction: &Prediction) {
    println!("Guess: {}", prediction.top);
    for guess in &prediction.ranking {
        println!("  {}: {:.4}", guess.label, guess.probability);
    }
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    let model = ModelFile::load(&args.model)
        .with_context(|| format!("loading model {}", args.model.display()))?;

    print!("Loading data... ");
    let _ = io::stdout().flush();
    let now = Instant::now();
    let samples: Vec<Sample> = match (&args.csv, &args.images, &args.labels) {
        (Some(csv), _, _) => load_mnist_csv(csv, args.limit)?,
        (None, Some(images), Some(labels)) => load_mnist_idx(images, labels, args.limit)?,
        _ => bail!("pass either --csv or --images with --labels"),
    };
    println!("Loaded {} examples [{}ms]", samples.len(), now.elapsed().as_millis());

    print!("Evaluating... ");
    let _ = io::stdout().flush();
    let now = Instant::now();
    let result = evaluate(&model, &samples)?;
    println!(
        "Done - Accuracy = {}/{} = {:.2}%, error = {:.4} [{}ms]",
        result.correct,
        result.total,
        result.accuracy * 100.0,
        result.mean_error,
        now.elapsed().as_millis()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("12.5 40").unwrap(), (12.5, 40.0));
        assert_eq!(parse_point("3,4").unwrap(), (3.0, 4.0));
        assert!(parse_point("3").is_err());
        assert!(parse_point("1 2 3").is_err());
        assert!(parse_point("a b").is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["digit-sketch", "init", "--out", "m.json"]).unwrap();
        match cli.command {
            Command::Init(args) => assert_eq!(args.hidden, vec![64, 32]),
            other => panic!("unexpected command {:?}", other),
        }
        assert!(Cli::try_parse_from(["digit-sketch", "evaluate", "--model", "m.json", "--images", "i"]).is_err());
    }
}
