use clap::Parser;
use ringgauge::{
    hit_test, measure, Calibration, DecodeConfig, Detection, Detector, FrameScale, Measurement,
    NmsConfig, PipelineConfig, MODEL_INPUT_SIZE,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "RingGauge CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DecodeConfigJson {
    confidence_threshold: f32,
    parallel: bool,
}

impl Default for DecodeConfigJson {
    fn default() -> Self {
        let cfg = DecodeConfig::default();
        Self {
            confidence_threshold: cfg.confidence_threshold,
            parallel: cfg.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct NmsConfigJson {
    iou_threshold: f32,
}

impl Default for NmsConfigJson {
    fn default() -> Self {
        Self {
            iou_threshold: NmsConfig::default().iou_threshold,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FrameJson {
    width: f32,
    height: f32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CalibrationJson {
    reference_size_mm: Option<f32>,
    reference_index: Option<usize>,
    reference_point: Option<[f32; 2]>,
    pixels_per_mm: Option<f32>,
    input_size: f32,
}

impl Default for CalibrationJson {
    fn default() -> Self {
        Self {
            reference_size_mm: None,
            reference_index: None,
            reference_point: None,
            pixels_per_mm: None,
            input_size: MODEL_INPUT_SIZE,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    tensor_path: String,
    tensor_shape: Option<Vec<usize>>,
    output_path: Option<String>,
    decode: DecodeConfigJson,
    nms: NmsConfigJson,
    frame: Option<FrameJson>,
    calibration: Option<CalibrationJson>,
}

#[derive(Debug, Deserialize)]
struct TensorFile {
    shape: Vec<usize>,
    data: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    label: &'static str,
    class_id: usize,
    confidence: f32,
    bbox: [f32; 4],
    #[serde(skip_serializing_if = "Option::is_none")]
    frame_bbox: Option<[f32; 4]>,
    diameter_mm: Option<f32>,
}

impl DetectionRecord {
    fn new(m: &Measurement, scale: Option<&FrameScale>) -> Self {
        let det = &m.detection;
        let b = det.bbox;
        Self {
            label: det.label,
            class_id: det.class_id,
            confidence: det.confidence,
            bbox: [b.x1, b.y1, b.x2, b.y2],
            frame_bbox: scale.map(|s| {
                let f = s.to_frame(&b);
                [f.x1, f.y1, f.x2, f.y2]
            }),
            diameter_mm: m.diameter_mm,
        }
    }
}

#[derive(Debug, Serialize)]
struct CalibrationRecord {
    mode: &'static str,
    reference_size_mm: Option<f32>,
    pixels_per_mm: Option<f32>,
}

#[derive(Debug, Serialize)]
struct Output {
    detections: Vec<DetectionRecord>,
    calibration: CalibrationRecord,
}

fn load_tensor(
    path: &Path,
    shape: Option<&[usize]>,
) -> Result<(Vec<f32>, Vec<usize>), Box<dyn std::error::Error>> {
    if path.extension().is_some_and(|ext| ext == "json") {
        let text = fs::read_to_string(path)?;
        let file: TensorFile = serde_json::from_str(&text)?;
        return Ok((file.data, file.shape));
    }

    let shape = shape.ok_or("tensor_shape must be set for raw f32 tensor files")?;
    let bytes = fs::read(path)?;
    if bytes.len() % 4 != 0 {
        return Err("raw tensor file length is not a multiple of 4 bytes".into());
    }
    let data = bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    Ok((data, shape.to_vec()))
}

fn pick_reference<'a>(
    cfg: &CalibrationJson,
    detections: &'a [Detection],
    scale: Option<&FrameScale>,
) -> Result<Option<&'a Detection>, Box<dyn std::error::Error>> {
    if let Some(idx) = cfg.reference_index {
        let det = detections.get(idx).ok_or_else(|| {
            format!(
                "reference_index {idx} out of range ({} detections)",
                detections.len()
            )
        })?;
        return Ok(Some(det));
    }
    if let Some([px, py]) = cfg.reference_point {
        let scale = scale.ok_or("reference_point needs a frame size")?;
        let (x, y) = scale
            .to_normalized(px, py)
            .ok_or("frame size must be positive")?;
        let det = hit_test(detections, x, y)
            .ok_or_else(|| format!("no detection under reference_point ({px}, {py})"))?;
        return Ok(Some(det));
    }
    Ok(None)
}

fn calibrate(
    cfg: &CalibrationJson,
    detections: &[Detection],
    scale: Option<&FrameScale>,
) -> Result<Calibration, Box<dyn std::error::Error>> {
    if let Some(ppm) = cfg.pixels_per_mm {
        let size = cfg
            .reference_size_mm
            .ok_or("reference_size_mm must accompany pixels_per_mm")?;
        return Ok(Calibration::restore(size, ppm)?.with_input_size(cfg.input_size)?);
    }

    let mut cal = Calibration::new().with_input_size(cfg.input_size)?;
    let Some(size) = cfg.reference_size_mm else {
        return Ok(cal);
    };
    cal.set_reference_size(size)?;

    if let Some(reference) = pick_reference(cfg, detections, scale)? {
        cal.start_calibration()?;
        cal.select_reference(reference)?;
        cal.complete_calibration()?;
    }
    Ok(cal)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("ringgauge=debug".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.tensor_path.is_empty() {
        return Err("tensor_path must be set in the config".into());
    }

    let (tensor, shape) = load_tensor(
        Path::new(&config.tensor_path),
        config.tensor_shape.as_deref(),
    )?;

    let detector = Detector::new().with_config(PipelineConfig {
        decode: DecodeConfig {
            confidence_threshold: config.decode.confidence_threshold,
            parallel: config.decode.parallel,
        },
        nms: NmsConfig {
            iou_threshold: config.nms.iou_threshold,
        },
    });
    let detections = detector.detect(&tensor, &shape)?;

    let scale = config
        .frame
        .as_ref()
        .map(|f| FrameScale::new(f.width, f.height));
    let calibration = match &config.calibration {
        Some(cfg) => calibrate(cfg, &detections, scale.as_ref())?,
        None => Calibration::new(),
    };

    let measured = measure(&detections, &calibration);
    let output = Output {
        detections: measured
            .iter()
            .map(|m| DetectionRecord::new(m, scale.as_ref()))
            .collect(),
        calibration: CalibrationRecord {
            mode: calibration.mode().as_str(),
            reference_size_mm: calibration.reference_size_mm(),
            pixels_per_mm: calibration.pixels_per_mm(),
        },
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
