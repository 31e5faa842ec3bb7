use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::PathBuf,
    time::Instant,
};

use clap::{Args, Parser, Subcommand};
use postag::{Corpus, CorpusFormat, ParameterEstimator, ProbabilityModel, ReaderConfig, Tag, TagSet, Tagger, TrainerConfig};

#[derive(Debug, Parser)]
#[command(version)]
#[command(propagate_version = true)]
struct Argv {
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Estimate HMM parameters from tagged corpora.
    Train(TrainArgs),
    /// Tag whitespace-separated sentences, one per line.
    Tag(TagArgs),
    /// Print a summary of a model.
    Inspect {
        #[arg(short, long)]
        model: PathBuf,
    },
}

#[derive(Debug, Args)]
struct TrainArgs {
    #[arg(short, long, value_enum, default_value_t = CorpusFormat::Conllu)]
    format: CorpusFormat,
    /// JSON file with trainer settings; flags below override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    min_freq: Option<u64>,
    #[arg(long)]
    alpha: Option<f64>,
    /// Comma-separated tag universe, all UPOS tags by default.
    /// Sentences using any other tag are skipped.
    #[arg(long, value_delimiter = ',')]
    tags: Vec<Tag>,
    #[arg(long)]
    keep_case: bool,
    #[arg(short, long)]
    output: PathBuf,
    #[arg(required = true)]
    corpora: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct TagArgs {
    #[arg(short, long)]
    model: PathBuf,
    #[arg(long)]
    keep_case: bool,
    /// Input file, stdin when omitted.
    input: Option<PathBuf>,
}

fn train(args: TrainArgs) -> postag::Result<()> {
    let mut config = match &args.config {
        Some(path) => serde_json::from_reader(BufReader::new(File::open(path)?))?,
        None => TrainerConfig::default(),
    };
    if let Some(min_freq) = args.min_freq {
        config.min_freq = min_freq;
    }
    if let Some(alpha) = args.alpha {
        config.alpha = alpha;
    }
    log::info!("trainer config: {:?}", config);

    let reader = ReaderConfig { lowercase: !args.keep_case };
    let mut corpus = Corpus::default();
    for path in &args.corpora {
        corpus.read_path(path, args.format, &reader)?;
    }
    log::info!(
        "corpus (sentences: {}, tokens: {}, longest: {})",
        corpus.len(),
        corpus.total_items(),
        corpus.max_length()
    );

    let tags = if args.tags.is_empty() { TagSet::upos() } else { TagSet::new(&args.tags) };
    let begin = Instant::now();
    let estimator = ParameterEstimator::fit(tags, &corpus.sentences, &config)?;
    let model = estimator.derive();
    log::info!("training took: {:?}", begin.elapsed());
    model.save(&args.output)
}

fn tag(args: TagArgs) -> postag::Result<()> {
    let model = ProbabilityModel::load(&args.model)?;
    let tagger = Tagger::new(&model);
    let input: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    let mut out = BufWriter::new(io::stdout().lock());
    for line in input.lines() {
        let line = line?;
        let tokens: Vec<String> = line
            .split_whitespace()
            .map(|w| if args.keep_case { w.to_string() } else { w.to_lowercase() })
            .collect();
        if tokens.is_empty() {
            continue;
        }
        let tags = tagger.tag(&tokens)?;
        let tagged: Vec<String> = tokens.iter().zip(&tags).map(|(w, t)| format!("{w}/{t}")).collect();
        writeln!(out, "{}", tagged.join(" "))?;
    }
    out.flush()?;
    Ok(())
}

fn inspect(path: PathBuf) -> postag::Result<()> {
    let model = ProbabilityModel::load(&path)?;
    println!("tags: {}", model.num_tags());
    println!("words: {} (including {})", model.num_words(), postag::OOV);
    let mut start = model
        .tags()
        .iter()
        .map(|t| Ok((t, model.start_prob(t)?)))
        .collect::<postag::Result<Vec<_>>>()?;
    start.sort_by(|a, b| b.1.total_cmp(&a.1));
    println!("start probabilities:");
    for (t, p) in start {
        println!("\t{t}: {p:.6}");
    }
    Ok(())
}

fn main() {
    let argv = Argv::parse();
    let level = match argv.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    log::debug!("argv: {:?}", argv);

    let r = match argv.command {
        Command::Train(args) => train(args),
        Command::Tag(args) => tag(args),
        Command::Inspect { model } => inspect(model),
    };
    if let Err(e) = r {
        log::error!("{e}");
        std::process::exit(1);
    }
}
