use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ringgauge::{intersection_over_union, suppress, Detection, NmsConfig};

/// Clustered detections so that plenty of same-class overlaps occur.
fn make_detections(rng: &mut StdRng, count: usize) -> Vec<Detection> {
    let centers = [(0.25f32, 0.25f32), (0.5, 0.5), (0.7, 0.3), (0.3, 0.75)];
    (0..count)
        .map(|_| {
            let (cx, cy) = centers[rng.random_range(0..centers.len())];
            let jitter = 0.03f32;
            Detection::from_center(
                cx + rng.random_range(-jitter..jitter),
                cy + rng.random_range(-jitter..jitter),
                rng.random_range(0.08f32..0.2),
                rng.random_range(0.08f32..0.2),
                rng.random_range(0..3),
                // Coarse scores force confidence ties.
                (rng.random_range(41u32..=100) as f32) / 100.0,
            )
        })
        .collect()
}

#[test]
fn suppression_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(1);
    let cfg = NmsConfig::default();
    for _ in 0..200 {
        let count = rng.random_range(0..40);
        let input = make_detections(&mut rng, count);
        let once = suppress(&input, &cfg);
        let twice = suppress(&once, &cfg);
        assert_eq!(once, twice);
    }
}

#[test]
fn suppression_never_grows_the_set() {
    let mut rng = StdRng::seed_from_u64(2);
    let cfg = NmsConfig::default();
    for _ in 0..200 {
        let count = rng.random_range(0..40);
        let input = make_detections(&mut rng, count);
        assert!(suppress(&input, &cfg).len() <= input.len());
    }
}

#[test]
fn survivors_of_same_class_do_not_overlap_past_threshold() {
    let mut rng = StdRng::seed_from_u64(3);
    let cfg = NmsConfig::default();
    for _ in 0..200 {
        let input = make_detections(&mut rng, 40);
        let out = suppress(&input, &cfg);
        for (i, a) in out.iter().enumerate() {
            for b in out.iter().skip(i + 1) {
                if a.class_id == b.class_id {
                    assert!(intersection_over_union(&a.bbox, &b.bbox) <= cfg.iou_threshold);
                }
            }
        }
    }
}

#[test]
fn output_is_descending_and_drawn_from_input() {
    let mut rng = StdRng::seed_from_u64(4);
    let input = make_detections(&mut rng, 60);
    let out = suppress(&input, &NmsConfig::default());
    assert!(out.windows(2).all(|w| w[0].confidence >= w[1].confidence));
    assert!(out.iter().all(|d| input.contains(d)));
}
