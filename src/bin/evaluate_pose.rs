use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, ValueEnum};
use endopose::{
    bin_utils::sequence::{PredictionSource, SequenceLoader},
    evaluate_batch,
    io::dataset::EndovisSplit,
    model::PoseNetworkWeights,
    EvalError, EvalParams, GroundTruthFormat, WindowPolicy,
};
use log::{error, info};

#[derive(Clone, Copy, ValueEnum)]
enum GtFormatArg {
    Absolute,
    Relative,
}

#[derive(Clone, Copy, ValueEnum)]
enum WindowArg {
    Full,
    Truncated,
}

#[derive(Parser)]
struct Args {
    /// Folder with the trained pose network weights
    #[clap(long)]
    load_weights_folder: PathBuf,
    /// Root of the SCARED dataset, forwarded to the inference frontend
    #[clap(long)]
    data_path: Option<PathBuf>,
    /// Input frame height
    #[clap(long, default_value_t = 256)]
    height: usize,
    /// Input frame width
    #[clap(long, default_value_t = 320)]
    width: usize,
    /// Name of the model, used for the prediction archive folder
    #[clap(long, default_value = "endodac")]
    model_type: String,
    /// Evaluation split folder
    #[clap(long, default_value = "splits/endovis")]
    splits_dir: PathBuf,
    /// Sequences to evaluate
    #[clap(long, num_args = 1.., default_values_t = [1, 2, 3, 4])]
    sequences: Vec<usize>,
    /// JSON file with evaluation parameters
    #[clap(long)]
    config: Option<PathBuf>,
    /// Frames per evaluation window
    #[clap(long)]
    track_length: Option<usize>,
    /// How the ground truth archives are read
    #[clap(long, value_enum)]
    gt_format: Option<GtFormatArg>,
    /// Which windows are scored
    #[clap(long, value_enum)]
    windows: Option<WindowArg>,
    /// Number of worker threads
    #[clap(long, default_value_t = 12)]
    num_workers: usize,
    /// Maximum number of frame pairs per sequence
    #[clap(long)]
    max_frames: Option<usize>,
    /// Scores the prediction archives of a previous run instead of the exported outputs
    #[clap(long, short, action)]
    reuse_predictions: bool,
}

fn eval_params(args: &Args) -> Result<EvalParams, EvalError> {
    let mut params = match &args.config {
        Some(path) => EvalParams::from_json_file(path)?,
        None => EvalParams::default(),
    };
    if let Some(track_length) = args.track_length {
        params.track_length(track_length);
    }
    if let Some(format) = args.gt_format {
        params.ground_truth(match format {
            GtFormatArg::Absolute => GroundTruthFormat::Absolute,
            GtFormatArg::Relative => GroundTruthFormat::Relative,
        });
    }
    if let Some(windows) = args.windows {
        params.window_policy(match windows {
            WindowArg::Full => WindowPolicy::Full,
            WindowArg::Truncated => WindowPolicy::Truncated,
        });
    }
    params.validate()?;
    Ok(params)
}

fn run(args: Args) -> Result<bool, EvalError> {
    let weights = PoseNetworkWeights::locate(&args.load_weights_folder)?;
    info!(
        "-> Loading weights from {}",
        args.load_weights_folder.display()
    );
    info!(
        "Pose encoder: {}, pose decoder: {}",
        weights.pose_encoder.display(),
        weights.pose_decoder.display()
    );

    match &args.data_path {
        Some(data_path) => info!(
            "Dataset {} at {}x{}",
            data_path.display(),
            args.height,
            args.width
        ),
        None => info!("Frames at {}x{}", args.height, args.width),
    }

    let params = eval_params(&args)?;
    info!("Evaluation parameters: {params:?}");

    rayon::ThreadPoolBuilder::new()
        .num_threads(args.num_workers)
        .build_global()
        .map_err(|err| EvalError::invalid_parameter(err.to_string()))?;

    let loader = SequenceLoader {
        split: EndovisSplit::new(&args.splits_dir),
        weights_folder: args.load_weights_folder.clone(),
        model_type: args.model_type.clone(),
        source: if args.reuse_predictions {
            PredictionSource::SavedPredictions
        } else {
            PredictionSource::ExportedOutputs
        },
        max_pairs: args.max_frames,
        show_progress: true,
    };

    println!("-> Computing pose predictions");
    let mut failed = 0;
    let mut labels = Vec::new();
    let mut inputs = Vec::new();
    for (i, &sequence) in args.sequences.iter().enumerate() {
        match loader.load(sequence) {
            Ok(input) => {
                labels.push(i);
                inputs.push(input);
            }
            Err(err) => {
                error!("Sequence {sequence}: {err}");
                failed += 1;
            }
        }
    }

    let results = evaluate_batch(&inputs, &params);
    for ((i, input), result) in labels.iter().zip(&inputs).zip(results) {
        match result {
            Ok(evaluation) => {
                println!("{}", evaluation.report(*i));
                info!(
                    "Sequence {}: mean RE {:.4} rad over {} windows",
                    input.id,
                    evaluation.mean_re,
                    evaluation.windows.len()
                );
            }
            Err(err) => {
                error!("Sequence {}: {err}", input.id);
                failed += 1;
            }
        }
    }

    Ok(failed == 0)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
