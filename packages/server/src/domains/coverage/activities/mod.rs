pub mod areas;
pub mod associations;

pub use areas::{
    coverage_area_preview, create_coverage_area, get_coverage_area, search_coverage_areas, update_coverage_area,
};
pub use associations::{
    attach_resource_to_coverage_area, detach_resource_from_coverage_area, list_areas_for_resource,
    list_resources_for_area,
};
