use std::sync::Arc;

use approx::assert_relative_eq;
use ndarray::Array3;
use pretty_assertions::assert_eq;

use dicom_viewer::{
    Catalog, ColorChoice, Orientation, PipelineError, Renderable, Renderer, SlicePipeline,
    SlotPipelines, SoftwareRenderer, Surface, Volume, plane_for,
};

fn volume(nx: usize, ny: usize, nz: usize) -> Arc<Volume> {
    let data = Array3::from_shape_fn((nz, ny, nx), |(z, y, x)| (x + 2 * y + 4 * z) as f32);
    Arc::new(Volume::new(data, (0.5, 0.5, 2.0)))
}

#[test]
fn slider_range_matches_each_planes_depth() {
    let pipelines = SlotPipelines::build(volume(256, 256, 128)).unwrap();
    let ranges: Vec<_> = Orientation::ALL
        .into_iter()
        .map(|plane| pipelines.slice(plane).offset_range())
        .collect();
    assert_eq!(ranges, vec![(0, 127), (0, 255), (0, 255)]);
}

#[test]
fn offset_moves_exactly_one_transform_cell() {
    let volume = volume(8, 6, 4);
    for orientation in Orientation::ALL {
        let plane = plane_for(orientation);
        let mut pipeline = SlicePipeline::build(Arc::clone(&volume), plane).unwrap();
        pipeline.set_offset(3).unwrap();
        pipeline.update().unwrap();

        let (row, col) = plane.offset_cell;
        let matrix = pipeline.reslice_axes().matrix();
        for (i, (actual, template)) in matrix.iter().zip(plane.transform.iter()).enumerate() {
            if i == row * 4 + col {
                assert_eq!(*actual, 3.0);
            } else {
                assert_eq!(actual, template, "{orientation} cell {i}");
            }
        }
    }
}

#[test]
fn rejected_offset_keeps_the_last_good_cross_section() {
    let mut pipeline = SlicePipeline::build(volume(8, 6, 4), plane_for(Orientation::Axial)).unwrap();
    pipeline.set_offset(2).unwrap();
    pipeline.update().unwrap();
    let before = pipeline.cross_section().to_owned();

    assert_eq!(
        pipeline.set_offset(4),
        Err(PipelineError::OffsetOutOfRange {
            value: 4,
            min: 0,
            max: 3
        })
    );
    pipeline.update().unwrap();
    assert_eq!(pipeline.offset(), 2);
    assert_eq!(pipeline.cross_section(), before.view());
}

#[test]
fn slice_tables_are_ranged_to_their_own_volume() {
    let catalog = Catalog::standard();
    let hot = catalog.lookup_table(ColorChoice::Hot.lookup_table_name()).unwrap();

    let mut small = SlicePipeline::build(volume(2, 2, 2), plane_for(Orientation::Axial)).unwrap();
    let mut large = SlicePipeline::build(volume(8, 8, 8), plane_for(Orientation::Axial)).unwrap();
    small.apply_color_map(hot);
    large.apply_color_map(hot);

    assert_eq!(small.lookup_table().range(), (0.0, 7.0));
    assert_eq!(large.lookup_table().range(), (0.0, 49.0));
    // the catalog copy is untouched
    assert_eq!(hot.range(), (0.0, 1.0));
}

#[test]
fn volume_colour_is_stretched_over_the_scalar_range() {
    let catalog = Catalog::standard();
    let mut pipelines = SlotPipelines::build(volume(8, 8, 8)).unwrap();
    let (min, max) = pipelines.volume().scalar_range();

    let grey = pipelines.volume_pipeline().classify((min + max) / 2.0);
    assert_relative_eq!(grey[0], 0.5);

    let rainbow = catalog
        .transfer_curve(ColorChoice::Rainbow.transfer_curve_name())
        .unwrap();
    pipelines.volume_pipeline_mut().set_color_curve(rainbow);
    let [r, g, b, _] = pipelines.volume_pipeline().classify(min);
    assert_eq!([r, g, b], [0.0, 0.0, 1.0]);
    let [r, g, b, _] = pipelines.volume_pipeline().classify(max);
    assert_eq!([r, g, b], [1.0, 0.0, 0.0]);
}

#[test]
fn software_renderer_layers_slot_2_over_slot_1() {
    let first = SlotPipelines::build(volume(4, 4, 4)).unwrap();
    let mut second = SlotPipelines::build(volume(4, 4, 4)).unwrap();
    let catalog = Catalog::standard();
    let hot = catalog.lookup_table(ColorChoice::Hot.lookup_table_name()).unwrap();
    for pipeline in second.slices_mut() {
        pipeline.apply_color_map(hot);
        pipeline.set_opacity(0.0);
    }

    let mut renderer = SoftwareRenderer::new(4, 4);
    renderer
        .render(
            Surface::Axial,
            &[
                first.renderable(Surface::Axial),
                second.renderable(Surface::Axial),
            ],
        )
        .unwrap();
    let only_first = renderer.frame(Surface::Axial).clone();

    renderer
        .render(Surface::Axial, &[first.renderable(Surface::Axial)])
        .unwrap();
    // a fully transparent top layer leaves the bottom layer as is
    assert_eq!(renderer.frame(Surface::Axial), &only_first);
    assert_eq!(renderer.render_count(Surface::Axial), 2);

    assert!(matches!(
        first.renderable(Surface::Volume),
        Renderable::Volume(_)
    ));
}
