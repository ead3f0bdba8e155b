mod common;

use common::synthetic_image::textured_rgb;
use salcrop::core::saliency::edge_gradient_saliency;
use salcrop::{
    AspectRatio, CompositionScorer, CropParams, CropSearchEngine, IntegralTable, NoProgress,
};

fn ratios() -> Vec<AspectRatio> {
    vec![
        AspectRatio::SQUARE,
        AspectRatio::PORTRAIT_4_5,
        AspectRatio::WIDE_16_9,
        AspectRatio::TALL_9_16,
        AspectRatio::new(3, 2).unwrap(),
        AspectRatio::new(2, 3).unwrap(),
    ]
}

fn small_stride_engine() -> CropSearchEngine {
    CropSearchEngine::new(CropParams {
        stride: 7,
        ..CropParams::default()
    })
    .unwrap()
}

#[test]
fn winners_respect_bounds_and_aspect_ratio() {
    let engine = small_stride_engine();
    for &(w, h) in &[(320u32, 240u32), (240, 320), (97, 203), (500, 120)] {
        let map = edge_gradient_saliency(&textured_rgb(w, h));
        let table = IntegralTable::build(&map);
        let winners = engine
            .search(&table, &CompositionScorer::new(), &ratios(), &NoProgress)
            .unwrap();

        for winner in &winners {
            let rect = winner.candidate.rect;
            assert!(rect.fits_within(w, h), "{rect} escapes {w}x{h}");

            let target = winner.aspect_ratio.value();
            let actual = rect.width as f64 / rect.height as f64;
            // Flooring one side moves the ratio by at most max(target, 1) / height.
            let tolerance = target.max(1.0) / rect.height as f64;
            assert!(
                (actual - target).abs() <= tolerance,
                "{} on {w}x{h}: got {rect} ({actual:.4})",
                winner.aspect_ratio
            );
        }
    }
}

#[test]
fn enumerated_corners_stay_inside_margins() {
    let engine = small_stride_engine();
    let margin = engine.params().edge_margin;
    let (w, h) = (300u32, 200u32);
    for ratio in ratios() {
        for rect in engine.candidate_windows(w, h, ratio) {
            let mx = (rect.width as f64 * margin).floor() as u32;
            let my = (rect.height as f64 * margin).floor() as u32;
            assert!(rect.x >= mx && rect.x + rect.width + mx <= w, "{ratio}: {rect}");
            assert!(rect.y >= my && rect.y + rect.height + my <= h, "{ratio}: {rect}");
        }
    }
}

#[test]
fn impossible_ratio_is_omitted_not_fatal() {
    let engine = CropSearchEngine::new(CropParams::default()).unwrap();
    let map = edge_gradient_saliency(&textured_rgb(10, 10));
    let table = IntegralTable::build(&map);
    let extreme = AspectRatio::new(100, 1).unwrap();
    let very_tall = AspectRatio::new(1, 100).unwrap();

    let winners = engine
        .search(
            &table,
            &CompositionScorer::new(),
            &[extreme, AspectRatio::SQUARE, very_tall],
            &NoProgress,
        )
        .unwrap();

    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].aspect_ratio, AspectRatio::SQUARE);
}

#[test]
fn search_is_deterministic() {
    let engine = small_stride_engine();
    let map = edge_gradient_saliency(&textured_rgb(192, 256));
    let table = IntegralTable::build(&map);
    let first = engine
        .search(&table, &CompositionScorer::new(), &ratios(), &NoProgress)
        .unwrap();
    let second = engine
        .search(&table, &CompositionScorer::new(), &ratios(), &NoProgress)
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), ratios().len());
}

#[test]
fn integral_sums_match_direct_means() {
    let map = edge_gradient_saliency(&textured_rgb(64, 48));
    let table = IntegralTable::build(&map);
    let engine = small_stride_engine();
    for rect in engine.candidate_windows(64, 48, AspectRatio::WIDE_16_9) {
        let direct = map.mean(&rect).unwrap();
        let fast = table.rect_sum(rect.x, rect.y, rect.width, rect.height) as f64
            / rect.area() as f64;
        assert!((direct - fast).abs() < 1e-9);
    }
}
