use async_trait::async_trait;
use std::ffi::OsString;
use std::sync::Mutex;
use tubely_processing::{ProcessOutput, ProcessRunner};

/// Stands in for ffprobe/ffmpeg.
///
/// ffprobe reports one video stream of the configured size (or fails when
/// `probe_fails`); ffmpeg copies its input to the output path.
pub struct FakeMediaTools {
    width: u32,
    height: u32,
    probe_fails: bool,
    pub programs: Mutex<Vec<String>>,
}

impl FakeMediaTools {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            probe_fails: false,
            programs: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_probe() -> Self {
        Self {
            probe_fails: true,
            ..Self::new(0, 0)
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.programs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessRunner for FakeMediaTools {
    async fn run(&self, program: &str, args: &[OsString]) -> std::io::Result<ProcessOutput> {
        self.programs.lock().unwrap().push(program.to_string());

        match program {
            "ffprobe" if self.probe_fails => Ok(ProcessOutput {
                success: false,
                code: Some(1),
                stderr: b"Invalid data found when processing input".to_vec(),
                ..Default::default()
            }),
            "ffprobe" => Ok(ProcessOutput {
                success: true,
                code: Some(0),
                stdout: format!(
                    r#"{{"streams":[{{"index":0,"codec_type":"video","width":{},"height":{}}}]}}"#,
                    self.width, self.height
                )
                .into_bytes(),
                ..Default::default()
            }),
            "ffmpeg" => {
                let input = args
                    .iter()
                    .position(|a| a == "-i")
                    .and_then(|i| args.get(i + 1))
                    .expect("remux call has -i");
                let output = args.last().expect("remux call has an output");
                std::fs::copy(input, output)?;
                Ok(ProcessOutput {
                    success: true,
                    code: Some(0),
                    ..Default::default()
                })
            }
            other => panic!("unexpected program {}", other),
        }
    }
}

/// Bytes standing in for an MP4; the fake tools never parse them.
pub fn fake_mp4(len: usize) -> Vec<u8> {
    let mut data = b"\x00\x00\x00\x18ftypmp42".to_vec();
    data.resize(len, 0xAB);
    data
}

pub fn create_minimal_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
        0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08, 0xD7, 0x63, 0xF8,
        0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x18, 0xDD, 0x8D, 0x89, 0x00, 0x00, 0x00,
        0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}
