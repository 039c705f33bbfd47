use pixlator::EngineConfig;
use pixlator::core_modules::sequence_encoder::sequence_encoder;
use pixlator::parallel_pipeline::{ClassifyJob, ParallelPipeline};
use pixlator::pipeline::{
    ClassificationPipeline, ClassificationResult, ClassifyRequest, NumberingMode, PaletteIndex,
    PixelGrid,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::sync::Arc;

const COLORS: usize = 5;

/// Seeded so every run sees the same grids.
fn random_grid(width: usize, height: usize, seed: u64) -> PixelGrid {
    let mut rng = StdRng::seed_from_u64(seed);
    let rows = (0..height)
        .map(|_| (0..width).map(|_| rng.gen_range(0..COLORS)).collect())
        .collect();
    PixelGrid::from_rows(rows).unwrap()
}

fn palette() -> PaletteIndex {
    PaletteIndex::new((0..COLORS as u8).map(|i| [i * 50, 255 - i * 50, i])).unwrap()
}

fn classify(grid: PixelGrid, mode: NumberingMode) -> ClassificationResult {
    ClassificationPipeline::default()
        .classify(&ClassifyRequest::new(100).numbering_mode(mode), grid, palette())
        .unwrap()
}

const SIZES: [(usize, usize); 8] = [
    (1, 1),
    (1, 7),
    (7, 1),
    (2, 3),
    (5, 5),
    (9, 4),
    (4, 9),
    (16, 11),
];

#[test]
fn groups_cover_the_grid_without_gaps() {
    for (seed, &(w, h)) in SIZES.iter().enumerate() {
        for mode in NumberingMode::ALL {
            let result = classify(random_grid(w, h, seed as u64), mode);

            let used: HashSet<usize> = result
                .pixel_data()
                .iter()
                .flatten()
                .map(|p| p.group_number)
                .collect();
            let max = used.iter().copied().max().unwrap();
            assert_eq!(result.group_count(), max + 1, "{w}x{h} {mode}");
            assert_eq!(used.len(), max + 1, "{w}x{h} {mode}");

            let covered: usize = result.group_stats().iter().map(|g| g.pixel_count()).sum();
            assert_eq!(covered, w * h, "{w}x{h} {mode}");

            let counted: usize = result.color_stats().iter().map(|c| c.count).sum();
            assert_eq!(counted, w * h, "{w}x{h} {mode}");
        }
    }
}

#[test]
fn sequences_decode_to_the_path_colors() {
    for (seed, &(w, h)) in SIZES.iter().enumerate() {
        for mode in NumberingMode::ALL {
            let result = classify(random_grid(w, h, 100 + seed as u64), mode);
            for stat in result.group_stats() {
                let path = result.group_path(stat.group_number).unwrap();
                let along_path: Vec<usize> = path
                    .iter()
                    .map(|p| result.grid().color_at(p.x, p.y).unwrap())
                    .collect();
                assert_eq!(sequence_encoder::decode(&stat.sequence), along_path);
                assert!(stat.sequence.iter().all(|run| run.run_length >= 1));
                assert!(
                    stat.sequence
                        .windows(2)
                        .all(|pair| pair[0].color_index != pair[1].color_index)
                );
            }
        }
    }
}

#[test]
fn paths_alternate_direction_by_parity() {
    let result = classify(random_grid(6, 5, 7), NumberingMode::DiagonalBottomRight);
    for stat in result.group_stats() {
        let xs: Vec<u32> = result
            .group_path(stat.group_number)
            .unwrap()
            .iter()
            .map(|p| p.x)
            .collect();
        if stat.group_number % 2 == 0 {
            assert!(xs.windows(2).all(|w| w[0] < w[1]));
        } else {
            assert!(xs.windows(2).all(|w| w[0] > w[1]));
        }
    }
}

#[test]
fn stats_are_sorted_and_positions_row_major() {
    let result = classify(random_grid(8, 6, 42), NumberingMode::BottomToTop);

    let indices: Vec<usize> = result.color_stats().iter().map(|c| c.color_index).collect();
    assert!(indices.windows(2).all(|w| w[0] < w[1]));

    let groups: Vec<usize> = result.group_stats().iter().map(|g| g.group_number).collect();
    assert_eq!(groups, (0..result.group_count()).collect::<Vec<_>>());

    for stat in result.color_stats() {
        assert!(stat.count > 0);
        assert_eq!(stat.hex, result.palette().hex(stat.color_index).unwrap());
        assert!(
            stat.positions
                .windows(2)
                .all(|w| (w[0].y, w[0].x) < (w[1].y, w[1].x))
        );
    }
}

#[test]
fn identical_input_gives_identical_json() {
    for mode in NumberingMode::ALL {
        let a = classify(random_grid(9, 7, 3), mode).to_json(false).unwrap();
        let b = classify(random_grid(9, 7, 3), mode).to_json(false).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn json_layout() {
    let grid = PixelGrid::from_rows(vec![vec![0, 1]]).unwrap();
    let palette = PaletteIndex::new([[0, 0, 0], [255, 255, 255]]).unwrap();
    let result = ClassificationPipeline::default()
        .classify(
            &ClassifyRequest::new(2).numbering_mode(NumberingMode::TopToBottom),
            grid,
            palette,
        )
        .unwrap();

    let expected = concat!(
        r##"{"dimensions":{"width":2,"height":1},"numbering_mode":"top_to_bottom","##,
        r##""processing_params":{"width_bound":2,"color_count_hint":null,"##,
        r##""processed_dimensions":{"width":2,"height":1}},"##,
        r##""palette":[{"rgb":[0,0,0],"hex":"#000000"},"##,
        r##"{"rgb":[255,255,255],"hex":"#FFFFFF"}],"##,
        r##""pixel_data":[[{"x":0,"y":0,"color_index":0,"group_number":0},"##,
        r##"{"x":1,"y":0,"color_index":1,"group_number":0}]],"##,
        r##""color_stats":[{"color_index":0,"rgb":[0,0,0],"hex":"#000000","count":1,"##,
        r##""positions":[[0,0]]},"##,
        r##"{"color_index":1,"rgb":[255,255,255],"hex":"#FFFFFF","count":1,"##,
        r##""positions":[[1,0]]}],"##,
        r##""group_stats":[{"group_number":0,"sequence":[[0,1],[1,1]]}]}"##,
    );
    assert_eq!(result.to_json(false).unwrap(), expected);
}

#[tokio::test]
async fn batch_results_keep_submission_order() {
    let pipeline = ParallelPipeline::new(EngineConfig {
        worker_count: 3,
        ..EngineConfig::default()
    });
    let palette = Arc::new(palette());

    let jobs: Vec<ClassifyJob> = SIZES
        .iter()
        .zip(NumberingMode::ALL.iter().cycle())
        .enumerate()
        .map(|(seed, (&(w, h), &mode))| {
            ClassifyJob::new(
                ClassifyRequest::new(100).numbering_mode(mode),
                random_grid(w, h, seed as u64),
                Arc::clone(&palette),
            )
        })
        .collect();
    let expected: Vec<ClassificationResult> = jobs
        .iter()
        .map(|job| classify((*job.grid).clone(), job.request.numbering_mode))
        .collect();

    let results = pipeline.process_batch(jobs).await;
    assert_eq!(results.len(), expected.len());
    for (got, want) in results.into_iter().zip(expected) {
        assert_eq!(got.unwrap(), want);
    }
    pipeline.shutdown().await;
}
