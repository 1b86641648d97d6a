use motionprobe_model::{Direction, Frame, MotionClass, MotionSpec, SuiteKinematics};
use motionprobe_transform::{GenerateOptions, MotionTransformEngine};

/// Small textured source: every pixel differs from its neighbours.
fn textured_source(frames: usize) -> Vec<Frame> {
    let (width, height) = (48u32, 32u32);
    (0..frames)
        .map(|i| {
            let mut pixels = Vec::with_capacity((width * height * 3) as usize);
            for y in 0..height {
                for x in 0..width {
                    pixels.push((x * 5 + i as u32) as u8);
                    pixels.push((y * 7) as u8);
                    pixels.push(((x * y) % 251) as u8);
                }
            }
            Frame::from_rgb(width, height, pixels).expect("valid frame")
        })
        .collect()
}

fn engine() -> MotionTransformEngine {
    MotionTransformEngine::new(GenerateOptions {
        frame_count: Some(12),
        ..Default::default()
    })
}

#[test]
fn parallel_batch_matches_sequential_generation() {
    let source = textured_source(4);
    let specs = MotionSpec::canonical_suite(&SuiteKinematics::default()).expect("suite");
    let engine = engine();

    let parallel = engine.generate_batch(&source, &specs);
    assert_eq!(parallel.len(), 9);

    for (spec, result) in specs.iter().zip(parallel) {
        let batch_clip = result.expect("clip generates");
        let single_clip = engine.generate(&source, spec).expect("clip generates");
        assert_eq!(batch_clip, single_clip, "{}", spec.label());
    }
}

#[test]
fn canonical_ids_are_labels() {
    let source = textured_source(2);
    let specs = MotionSpec::canonical_suite(&SuiteKinematics::default()).expect("suite");
    let ids: Vec<String> = engine()
        .generate_batch(&source, &specs)
        .into_iter()
        .map(|r| r.expect("clip generates").id().to_string())
        .collect();
    assert_eq!(ids, MotionSpec::CANONICAL_LABELS.map(String::from).to_vec());
}

#[test]
fn static_frames_are_bit_identical() {
    let source = textured_source(12);
    let clip = engine()
        .generate(&source, &MotionSpec::stationary())
        .expect("static clip");
    for (out, src) in clip.frames().iter().zip(&source) {
        assert_eq!(out.pixels(), src.pixels());
    }
}

#[test]
fn moving_clips_change_after_the_first_frame() {
    let source = vec![textured_source(1).remove(0); 12];
    let kinematics = SuiteKinematics::default();
    for spec in MotionSpec::canonical_suite(&kinematics).expect("suite") {
        if spec.class == MotionClass::Static {
            continue;
        }
        let clip = engine().generate(&source, &spec).expect("clip");
        let last = clip.frames().last().expect("frames");
        assert_ne!(last.pixels(), source[0].pixels(), "{}", spec.label());
    }
}

#[test]
fn dolly_and_zoom_differ_at_equal_max_zoom() {
    let source = textured_source(1);
    let engine = engine();
    let zoom = engine
        .generate(&source, &MotionSpec::zoom(Direction::In, 1.0, 1.5).expect("zoom"))
        .expect("zoom clip");
    let dolly = engine
        .generate(&source, &MotionSpec::dolly(Direction::In, 1.0, 1.5).expect("dolly"))
        .expect("dolly clip");
    assert_ne!(zoom.frames().last(), dolly.frames().last());

    for params in engine.params_trace(dolly.ground_truth(), 12) {
        assert!(params.scale_factors().len() >= 2);
    }
}
