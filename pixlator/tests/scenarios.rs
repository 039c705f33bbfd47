use pixlator::ErrorKind;
use pixlator::error::ClassifyError;
use pixlator::pipeline::{
    ClassificationPipeline, ClassifyRequest, GridDocument, Highlight, NumberingMode, PaletteIndex,
    PixelGrid, Point,
};

fn palette(n: u8) -> PaletteIndex {
    PaletteIndex::new((0..n).map(|i| [i * 40, i * 20, 255 - i])).unwrap()
}

fn runs(result: &pixlator::pipeline::ClassificationResult, group: usize) -> Vec<(usize, usize)> {
    result.group_stats()[group]
        .sequence
        .iter()
        .copied()
        .map(Into::into)
        .collect()
}

#[test]
fn two_by_two_anti_diagonals() {
    let pipeline = ClassificationPipeline::default();
    let grid = PixelGrid::from_rows(vec![vec![0, 1], vec![1, 0]]).unwrap();
    let request = ClassifyRequest::new(2).numbering_mode(NumberingMode::DiagonalBottomRight);
    let result = pipeline.classify(&request, grid, palette(2)).unwrap();

    assert_eq!(result.group_count(), 3);
    assert_eq!(runs(&result, 0), vec![(0, 1)]);
    assert_eq!(runs(&result, 1), vec![(1, 2)]);
    assert_eq!(runs(&result, 2), vec![(0, 1)]);
    assert_eq!(
        result.group_path(1).unwrap(),
        vec![Point::new(1, 0), Point::new(0, 1)]
    );

    let colors = result.color_stats();
    assert_eq!(colors.len(), 2);
    assert_eq!(colors[0].count, 2);
    assert_eq!(colors[0].positions, vec![Point::new(0, 0), Point::new(1, 1)]);
    assert_eq!(colors[1].count, 2);
    assert_eq!(colors[1].positions, vec![Point::new(1, 0), Point::new(0, 1)]);
}

#[test]
fn single_row_is_one_ascending_group() {
    let pipeline = ClassificationPipeline::default();
    let grid = PixelGrid::from_rows(vec![vec![0, 0, 1]]).unwrap();
    let request = ClassifyRequest::new(3).numbering_mode(NumberingMode::TopToBottom);
    let result = pipeline.classify(&request, grid, palette(2)).unwrap();

    assert_eq!(result.group_count(), 1);
    assert_eq!(runs(&result, 0), vec![(0, 2), (1, 1)]);
}

#[test]
fn unknown_color_index_is_an_input_error() {
    let pipeline = ClassificationPipeline::default();
    let grid = PixelGrid::from_rows(vec![vec![0, 1], vec![5, 3]]).unwrap();
    let err = pipeline
        .classify(&ClassifyRequest::new(10), grid, palette(4))
        .unwrap_err();

    assert_eq!(
        err,
        ClassifyError::UnknownColorIndex {
            x: 0,
            y: 1,
            index: 5,
            palette_len: 4
        }
    );
    assert_eq!(err.kind(), ErrorKind::InputConsistency);
    assert!(!err.is_recoverable());
}

#[test]
fn single_pixel_in_every_mode() {
    let pipeline = ClassificationPipeline::default();
    for mode in NumberingMode::ALL {
        let grid = PixelGrid::from_rows(vec![vec![0]]).unwrap();
        let request = ClassifyRequest::new(1).numbering_mode(mode);
        let result = pipeline.classify(&request, grid, palette(1)).unwrap();
        assert_eq!(result.group_count(), 1, "{mode}");
        assert_eq!(runs(&result, 0), vec![(0, 1)], "{mode}");
        assert_eq!(result.color_stats()[0].positions, vec![Point::new(0, 0)]);
    }
}

#[test]
fn bottom_to_top_numbers_from_the_last_row() {
    let pipeline = ClassificationPipeline::default();
    let grid = PixelGrid::from_rows(vec![vec![0, 1, 2], vec![2, 2, 0]]).unwrap();
    let request = ClassifyRequest::new(3).numbering_mode(NumberingMode::BottomToTop);
    let result = pipeline.classify(&request, grid, palette(3)).unwrap();

    // Row y=1 is group 0 (ascending x), row y=0 is group 1 (descending x).
    assert_eq!(runs(&result, 0), vec![(2, 2), (0, 1)]);
    assert_eq!(runs(&result, 1), vec![(2, 1), (1, 1), (0, 1)]);
    assert_eq!(result.group_number_at(0, 0), Some(1));
}

#[test]
fn diagonal_bottom_left_on_wide_grid() {
    let pipeline = ClassificationPipeline::default();
    let grid = PixelGrid::from_rows(vec![vec![0, 1, 2], vec![1, 1, 0]]).unwrap();
    let request = ClassifyRequest::new(3).numbering_mode(NumberingMode::DiagonalBottomLeft);
    let result = pipeline.classify(&request, grid, palette(3)).unwrap();

    assert_eq!(result.group_count(), 4);
    assert_eq!(result.group_path(0).unwrap(), vec![Point::new(2, 0)]);
    assert_eq!(
        result.group_path(1).unwrap(),
        vec![Point::new(2, 1), Point::new(1, 0)]
    );
    assert_eq!(
        result.group_path(2).unwrap(),
        vec![Point::new(0, 0), Point::new(1, 1)]
    );
    assert_eq!(result.group_path(3).unwrap(), vec![Point::new(0, 1)]);
    assert_eq!(runs(&result, 1), vec![(0, 1), (1, 1)]);
    assert_eq!(runs(&result, 2), vec![(0, 1), (1, 1)]);
}

#[test]
fn highlight_by_color_and_by_group() {
    let pipeline = ClassificationPipeline::default();
    let document = GridDocument {
        palette: vec![[255, 0, 0], [0, 0, 255]],
        grid: vec![vec![0, 1, 1], vec![1, 0, 0]],
    };
    let request = ClassifyRequest::new(3).numbering_mode(NumberingMode::TopToBottom);
    let result = pipeline.classify_document(&request, document).unwrap();

    let red = Highlight::color("ff0000").unwrap();
    assert_eq!(
        result.highlight_mask(&red),
        vec![true, false, false, false, true, true]
    );
    assert!(result.matches(&red, 0, 0));
    assert!(!result.matches(&red, 1, 0));

    let second_row = Highlight::group(1);
    assert_eq!(
        result.highlight_mask(&second_row),
        vec![false, false, false, true, true, true]
    );
}

#[test]
fn malformed_documents_are_rejected_before_classification() {
    let pipeline = ClassificationPipeline::default();
    let request = ClassifyRequest::new(10);

    let ragged = GridDocument {
        palette: vec![[0, 0, 0]],
        grid: vec![vec![0, 0], vec![0]],
    };
    assert!(matches!(
        pipeline.classify_document(&request, ragged),
        Err(ClassifyError::RaggedRow { row: 1, .. })
    ));

    let no_palette = GridDocument {
        palette: vec![],
        grid: vec![vec![0]],
    };
    assert_eq!(
        pipeline.classify_document(&request, no_palette),
        Err(ClassifyError::EmptyPalette)
    );
}
