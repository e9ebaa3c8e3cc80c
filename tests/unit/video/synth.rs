use super::*;

/// Records jobs and answers with scripted exit codes.
struct ScriptedTranscoder {
    exit_codes: Vec<i32>,
    jobs: Vec<TranscodeJob>,
}

impl ScriptedTranscoder {
    fn new(exit_codes: &[i32]) -> Self {
        Self {
            exit_codes: exit_codes.to_vec(),
            jobs: Vec::new(),
        }
    }
}

impl Transcoder for ScriptedTranscoder {
    fn run(&mut self, job: &TranscodeJob) -> StillreelResult<ProcessOutput> {
        let code = self.exit_codes.get(self.jobs.len()).copied().unwrap_or(0);
        self.jobs.push(job.clone());
        Ok(ProcessOutput {
            status: Some(code),
            stdout: String::new(),
            stderr: format!("{} stage said hello (code {code})", job.stage()),
        })
    }
}

fn request(dir: &Path) -> SynthesisRequest {
    SynthesisRequest {
        image: dir.join("transformed_image.jpg"),
        audio: dir.join("background_music.mp3"),
        silent_video: dir.join("out").join("output_video.mp4"),
        final_video: dir.join("out").join("output_with_audio.mp4"),
        spec: StillVideoSpec::default(),
    }
}

#[test]
fn runs_encode_then_mux_on_the_encoded_video() {
    let dir = tempfile::tempdir().unwrap();
    let req = request(dir.path());
    let mut t = ScriptedTranscoder::new(&[0, 0]);

    let report = synthesize(&mut t, &req).unwrap();

    assert_eq!(t.jobs.len(), 2);
    assert_eq!(
        t.jobs[0],
        TranscodeJob::EncodeStill {
            image: req.image.clone(),
            out: req.silent_video.clone(),
            spec: req.spec,
        }
    );
    assert_eq!(
        t.jobs[1],
        TranscodeJob::MuxAudio {
            video: req.silent_video.clone(),
            audio: req.audio.clone(),
            out: req.final_video.clone(),
        }
    );
    assert_eq!(report.encode.stage, TranscodeStage::Encode);
    assert_eq!(report.mux.output, req.final_video);
    assert!(report.encode.diagnostics.stderr.contains("encode stage"));
    assert!(dir.path().join("out").is_dir());
}

#[test]
fn failed_encode_skips_mux() {
    let dir = tempfile::tempdir().unwrap();
    let mut t = ScriptedTranscoder::new(&[1, 0]);

    let err = synthesize(&mut t, &request(dir.path())).unwrap_err();

    assert_eq!(t.jobs.len(), 1);
    assert_eq!(err.transcode_stage(), Some(TranscodeStage::Encode));
    let msg = err.to_string();
    assert!(msg.contains("exit status: 1"));
    assert!(msg.contains("encode stage said hello"));
}

#[test]
fn failed_mux_is_reported_with_its_stage() {
    let dir = tempfile::tempdir().unwrap();
    let mut t = ScriptedTranscoder::new(&[0, 69]);

    let err = synthesize(&mut t, &request(dir.path())).unwrap_err();

    assert_eq!(t.jobs.len(), 2);
    assert_eq!(err.transcode_stage(), Some(TranscodeStage::Mux));
}

#[test]
fn invalid_spec_runs_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut req = request(dir.path());
    req.spec = StillVideoSpec::with_duration(-1.0);
    let mut t = ScriptedTranscoder::new(&[]);

    assert!(matches!(
        synthesize(&mut t, &req).unwrap_err(),
        StillreelError::Validation(_)
    ));
    assert!(t.jobs.is_empty());
}

#[test]
fn identical_output_paths_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut req = request(dir.path());
    req.final_video = req.silent_video.clone();
    let mut t = ScriptedTranscoder::new(&[]);

    assert!(synthesize(&mut t, &req).is_err());
    assert!(t.jobs.is_empty());
}

#[test]
fn diagnostics_fall_back_to_stdout_then_placeholder() {
    let mut out = ProcessOutput {
        status: Some(1),
        stdout: " from stdout \n".to_string(),
        stderr: "  ".to_string(),
    };
    assert_eq!(diagnostics_text(&out), "from stdout");
    out.stdout.clear();
    assert_eq!(diagnostics_text(&out), "no diagnostic output");
}

#[test]
fn path_form_uses_default_spec_with_duration() {
    let dir = tempfile::tempdir().unwrap();
    let mut t = ScriptedTranscoder::new(&[0, 0]);
    synthesize_paths(
        &mut t,
        &dir.path().join("i.jpg"),
        &dir.path().join("a.mp3"),
        &dir.path().join("v.mp4"),
        &dir.path().join("f.mp4"),
        3.0,
    )
    .unwrap();
    let TranscodeJob::EncodeStill { spec, .. } = &t.jobs[0] else {
        panic!("first job must encode");
    };
    assert_eq!(*spec, StillVideoSpec::with_duration(3.0));
}

#[derive(Clone, Default)]
struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn successful_stage_stderr_is_logged_at_info() {
    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .finish();

    let dir = tempfile::tempdir().unwrap();
    let mut t = ScriptedTranscoder::new(&[0, 0]);
    tracing::subscriber::with_default(subscriber, || {
        synthesize(&mut t, &request(dir.path())).unwrap();
    });

    let text = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
    assert!(text.contains("encode stage said hello (code 0)"), "log: {text}");
    assert!(text.contains("mux stage said hello (code 0)"), "log: {text}");
}
