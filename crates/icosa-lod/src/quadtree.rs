//! Adaptive triangular quadtree over the icosahedron.
//!
//! Every tick walks the 20 base faces twice: first collapsing subtrees the
//! viewer has moved away from, then splitting faces the viewer has come
//! close to. A split synthesises the three edge midpoints, pushes them out
//! by the terrain displacement of the face's level, and replaces the face by
//! four children. Mesh rebuilds read the resulting leaves.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use glam::{DMat4, DVec3};
use icosa_mesh::{LeafTriangle, MeshSnapshot, WeldedMesh, stitch_seams, weld_leaves};
use icosa_terrain::{TerrainNoise, midpoint_direction};
use tracing::trace;

use crate::face::{Face, FaceId};
use crate::forest::FaceForest;
use crate::horizon_culling::HorizonCuller;
use crate::icosahedron::base_faces;
use crate::screen_bounds::ScreenCuller;
use crate::thresholds::LodThresholds;

/// Tuning of the quadtree, independent of the planet's size.
#[derive(Clone, Debug, PartialEq)]
pub struct LodSettings {
    /// Scales every split distance by `2^lod_multiplier`.
    pub lod_multiplier: u32,
    pub max_lod: u8,
    /// Fraction of the radius by which the horizon plane is lowered to allow
    /// for terrain relief.
    pub horizon_slack: f64,
    /// Close T-junctions between leaves of different levels on rebuild.
    pub stitch_seams: bool,
    /// Skip off-screen subtrees on rebuild when a view-projection is known.
    pub screen_culling: bool,
    /// NDC margin of the screen test.
    pub screen_margin: f64,
}

impl Default for LodSettings {
    fn default() -> Self {
        Self {
            lod_multiplier: 1,
            max_lod: 12,
            horizon_slack: 0.02,
            stitch_seams: true,
            screen_culling: true,
            screen_margin: 0.25,
        }
    }
}

/// Viewer input of one tick or rebuild, in planet object space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodView {
    /// Viewer position relative to the planet centre, in the planet's
    /// unrotated frame.
    pub viewer: DVec3,
    /// View-projection that maps object space to clip space, when known.
    pub view_projection: Option<DMat4>,
}

impl LodView {
    pub fn at(viewer: DVec3) -> Self {
        Self {
            viewer,
            view_projection: None,
        }
    }
}

/// Topology changes performed by one [`PlanetQuadtree::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    pub splits: usize,
    pub merges: usize,
}

impl TickStats {
    pub fn changed(&self) -> bool {
        self.splits > 0 || self.merges > 0
    }
}

struct RebuildCulling {
    viewer: DVec3,
    horizon: HorizonCuller,
    screen: Option<ScreenCuller>,
}

#[derive(Default)]
struct LeafCollection {
    leaves: Vec<LeafTriangle>,
    min_surface_distance: f64,
}

/// The face forest plus the rules that grow and shrink it.
///
/// Only one thread may own this. The closing flag is shared so another
/// thread can stop a long walk early; every operation checks it on entry
/// and refuses to change anything once it is set.
pub struct PlanetQuadtree {
    forest: FaceForest,
    terrain: TerrainNoise,
    thresholds: LodThresholds,
    settings: LodSettings,
    radius: f64,
    closing: Arc<AtomicBool>,
    stats: TickStats,
}

impl PlanetQuadtree {
    /// Build the 20 base faces of a planet of `radius`.
    pub fn new(
        radius: f64,
        settings: LodSettings,
        terrain: TerrainNoise,
        closing: Arc<AtomicBool>,
    ) -> Self {
        let mut forest = FaceForest::new();
        for corners in base_faces(radius) {
            forest.insert_root(Face::root(corners));
        }
        Self {
            forest,
            terrain,
            thresholds: LodThresholds::new(radius, settings.lod_multiplier, settings.max_lod),
            settings,
            radius,
            closing,
            stats: TickStats::default(),
        }
    }

    pub fn forest(&self) -> &FaceForest {
        &self.forest
    }

    pub fn thresholds(&self) -> &LodThresholds {
        &self.thresholds
    }

    pub fn settings(&self) -> &LodSettings {
        &self.settings
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn is_closing(&self) -> bool {
        self.closing.load(Ordering::Acquire)
    }

    fn horizon(&self, viewer: DVec3) -> HorizonCuller {
        HorizonCuller::new(viewer, self.radius, self.settings.horizon_slack)
    }

    /// Split `id` into four children if the viewer is close enough.
    ///
    /// Returns true when the face has children afterwards, including when
    /// it already had them.
    pub fn subdivide(&mut self, id: FaceId, viewer: DVec3) -> bool {
        if self.is_closing() {
            return false;
        }
        let Some(face) = self.forest.get(id) else {
            return false;
        };
        if face.level > 0 && !self.horizon(viewer).is_face_visible(&face.corners) {
            return false;
        }
        if !self
            .thresholds
            .should_split(face.level, face.max_corner_distance(viewer))
        {
            return false;
        }
        if face.is_expanded() {
            return true;
        }

        let children = self.split(face);
        if self.forest.attach_children(id, children).is_none() {
            return false;
        }
        self.stats.splits += 1;
        true
    }

    /// The four children of `face`: centre first, then the corner children
    /// of its first, second and third corner. All keep the parent's
    /// winding.
    fn split(&self, face: &Face) -> [Face; 4] {
        let level = face.level;
        let [v1, v2, v3] = face.corners;
        let [d1, d2, d3] = face.directions;

        let (m12, n12) = self.midpoint((v1, d1), (v2, d2), level);
        let (m23, n23) = self.midpoint((v2, d2), (v3, d3), level);
        let (m13, n13) = self.midpoint((v1, d1), (v3, d3), level);

        let child = |corners, directions| Face::with_directions(corners, directions, level + 1, None);
        [
            child([m12, m23, m13], [n12, n23, n13]),
            child([v1, m12, m13], [d1, n12, n13]),
            child([m12, v2, m23], [n12, d2, n23]),
            child([m13, m23, v3], [n13, n23, d3]),
        ]
    }

    /// Displaced midpoint of an edge and its unit direction.
    fn midpoint(&self, a: (DVec3, DVec3), b: (DVec3, DVec3), level: u8) -> (DVec3, DVec3) {
        let direction = midpoint_direction(a.1, b.1);
        let length = (a.0.length() + b.0.length()) * 0.5;
        let position = direction * (self.terrain.displacement(direction, level) * length);
        (position, direction)
    }

    /// Collapse the children of `id` if the viewer has moved far enough
    /// away, then try the same on its parent.
    ///
    /// Returns whether `id` itself collapsed. Base faces never collapse.
    pub fn combine(&mut self, id: FaceId, viewer: DVec3) -> bool {
        if self.is_closing() {
            return false;
        }
        let Some(face) = self.forest.get(id) else {
            return false;
        };
        if face.level == 0 || face.is_leaf() {
            return false;
        }
        if !self
            .thresholds
            .should_merge(face.level, face.min_corner_distance(viewer))
        {
            return false;
        }
        let parent = face.parent;

        self.forest.collapse(id);
        self.stats.merges += 1;
        if let Some(parent) = parent {
            self.combine(parent, viewer);
        }
        true
    }

    /// Subdivide `id` and, if it has children afterwards, recurse into
    /// them. Lets a fast approach expand several levels in one tick.
    pub fn recursive_subdivide(&mut self, id: FaceId, viewer: DVec3) -> bool {
        if !self.subdivide(id, viewer) {
            return false;
        }
        let Some(children) = self.forest.get(id).and_then(|face| face.children) else {
            return true;
        };
        for child in children {
            if self.is_closing() {
                break;
            }
            self.recursive_subdivide(child, viewer);
        }
        true
    }

    /// Combine `id`, or if it stays expanded, walk into its children.
    ///
    /// Returns whether `id` was collapsed, directly or by a cascade started
    /// in one of its descendants.
    pub fn recursive_combine(&mut self, id: FaceId, viewer: DVec3) -> bool {
        if self.combine(id, viewer) {
            return true;
        }
        let Some(children) = self.forest.get(id).and_then(|face| face.children) else {
            return false;
        };
        for child in children {
            if self.is_closing() {
                return false;
            }
            self.recursive_combine(child, viewer);
            if !self.forest.get(id).is_some_and(Face::is_expanded) {
                return true;
            }
        }
        false
    }

    /// One pass over the whole forest: combine walk then subdivide walk for
    /// every base face.
    pub fn tick(&mut self, viewer: DVec3) -> TickStats {
        self.stats = TickStats::default();
        for i in 0..self.forest.roots().len() {
            if self.is_closing() {
                break;
            }
            let root = self.forest.roots()[i];
            self.recursive_combine(root, viewer);
            self.recursive_subdivide(root, viewer);
        }
        trace!(
            splits = self.stats.splits,
            merges = self.stats.merges,
            faces = self.forest.len(),
            depth = self.forest.max_level(),
            "quadtree tick"
        );
        self.stats
    }

    /// Build a mesh of the visible leaves.
    ///
    /// The returned snapshot is unpublished (generation 0). When closing,
    /// the walk stops early and the snapshot is incomplete; callers should
    /// discard it.
    pub fn rebuild_mesh(&self, view: &LodView) -> MeshSnapshot {
        let started = Instant::now();
        let collected = self.collect_leaves(view);
        let welded = weld_leaves(&collected.leaves);
        let stitched = self
            .settings
            .stitch_seams
            .then(|| stitch_seams(&collected.leaves, &welded, self.thresholds.max_lod()));
        let WeldedMesh {
            vertices, indices, ..
        } = welded;

        MeshSnapshot {
            generation: 0,
            vertices,
            indices: stitched.unwrap_or(indices),
            leaf_count: collected.leaves.len(),
            min_surface_distance: collected.min_surface_distance,
            build_time: started.elapsed(),
        }
    }

    fn collect_leaves(&self, view: &LodView) -> LeafCollection {
        let screen = view
            .view_projection
            .filter(|_| self.settings.screen_culling)
            .map(|vp| ScreenCuller::new(vp, self.settings.screen_margin));
        let culling = RebuildCulling {
            viewer: view.viewer,
            horizon: self.horizon(view.viewer),
            screen,
        };
        let mut out = LeafCollection {
            leaves: Vec::new(),
            min_surface_distance: f64::INFINITY,
        };
        for &root in self.forest.roots() {
            self.collect_face(root, &culling, &mut out);
        }
        out
    }

    fn collect_face(&self, id: FaceId, culling: &RebuildCulling, out: &mut LeafCollection) {
        if self.is_closing() {
            return;
        }
        let Some(face) = self.forest.get(id) else {
            return;
        };
        out.min_surface_distance = out
            .min_surface_distance
            .min(face.min_corner_distance(culling.viewer));

        if face.level > 0 && !culling.horizon.is_face_visible(&face.corners) {
            return;
        }
        if let Some(screen) = &culling.screen
            && !screen.is_face_visible(&face.corners)
        {
            return;
        }

        match face.children {
            Some(children) => {
                let before = out.leaves.len();
                for child in children {
                    self.collect_face(child, culling, out);
                }
                // Visible face whose children were all culled: draw it whole
                // so the coarser surface stays covered.
                if out.leaves.len() == before && !self.is_closing() {
                    out.leaves.push(face.leaf_triangle());
                }
            }
            None => out.leaves.push(face.leaf_triangle()),
        }
    }
}

#[cfg(test)]
mod tests {
    use icosa_terrain::TerrainParams;

    use super::*;

    fn flat_terrain() -> TerrainNoise {
        TerrainNoise::new(TerrainParams {
            amplitude: 0.0,
            ..TerrainParams::default()
        })
    }

    fn quadtree(settings: LodSettings, terrain: TerrainNoise) -> PlanetQuadtree {
        PlanetQuadtree::new(1.0, settings, terrain, Arc::new(AtomicBool::new(false)))
    }

    fn flat(lod_multiplier: u32, stitch_seams: bool) -> PlanetQuadtree {
        quadtree(
            LodSettings {
                lod_multiplier,
                stitch_seams,
                horizon_slack: 0.0,
                ..LodSettings::default()
            },
            flat_terrain(),
        )
    }

    fn first_root_centroid_dir(tree: &PlanetQuadtree) -> DVec3 {
        let root = tree.forest().roots()[0];
        tree.forest().get(root).expect("root").centroid().normalize()
    }

    fn levels(tree: &PlanetQuadtree) -> Vec<u8> {
        tree.forest()
            .iter()
            .filter(|(_, f)| f.is_leaf())
            .map(|(_, f)| f.level)
            .collect()
    }

    /// Whether the ray from the centre along `dir` passes through one of the
    /// mesh triangles.
    fn mesh_covers(mesh: &MeshSnapshot, dir: DVec3) -> bool {
        let position = |i: u32| DVec3::from(mesh.vertices[i as usize].position.map(f64::from));
        mesh.indices.chunks_exact(3).any(|tri| {
            let [a, b, c] = [position(tri[0]), position(tri[1]), position(tri[2])];
            let sides = [
                dir.dot(a.cross(b)),
                dir.dot(b.cross(c)),
                dir.dot(c.cross(a)),
            ];
            let facing = dir.dot(a + b + c) > 0.0;
            facing && (sides.iter().all(|&s| s >= -1e-9) || sides.iter().all(|&s| s <= 1e-9))
        })
    }

    #[test]
    fn test_distant_viewer_sees_base_icosahedron() {
        let mut tree = quadtree(LodSettings::default(), TerrainNoise::new(TerrainParams::default()));
        let view = LodView::at(DVec3::new(0.0, 0.0, 10.0));
        let stats = tree.tick(view.viewer);
        assert!(!stats.changed());

        let mesh = tree.rebuild_mesh(&view);
        assert_eq!(mesh.triangle_count(), 20);
        assert!(mesh.vertices.len() <= 60);
        assert_eq!(mesh.vertices.len(), 12, "base corners should weld");
        assert_eq!(mesh.leaf_count, 20);
        assert!((mesh.min_surface_distance - 9.0).abs() < 0.2);
    }

    // Altitude radius / 2^lod_multiplier / 2 above a centroid, with a zero
    // multiplier.
    #[test]
    fn test_viewer_above_face_splits_only_that_face() {
        let mut tree = flat(0, false);
        let viewer = first_root_centroid_dir(&tree) * 1.5;
        let stats = tree.tick(viewer);
        assert_eq!(stats, TickStats { splits: 1, merges: 0 });

        let root = tree.forest().roots()[0];
        assert!(tree.forest().get(root).is_some_and(Face::is_expanded));
        assert_eq!(tree.forest().len(), 24);
        let mut leaf_levels = levels(&tree);
        leaf_levels.sort_unstable();
        assert_eq!(leaf_levels.iter().filter(|&&l| l == 1).count(), 4);
        assert_eq!(leaf_levels.len(), 23);

        let mesh = tree.rebuild_mesh(&LodView::at(viewer));
        assert_eq!(mesh.triangle_count(), 23);
    }

    #[test]
    fn test_stitching_closes_seams_around_split_face() {
        let mut tree = flat(0, true);
        let viewer = first_root_centroid_dir(&tree) * 1.5;
        tree.tick(viewer);
        let mesh = tree.rebuild_mesh(&LodView::at(viewer));
        assert_eq!(mesh.leaf_count, 23);
        // Each of the three neighbours gains one triangle.
        assert_eq!(mesh.triangle_count(), 26);
    }

    #[test]
    fn test_children_wind_outward_and_link_to_parent() {
        let mut tree = quadtree(LodSettings::default(), TerrainNoise::new(TerrainParams::default()));
        let viewer = first_root_centroid_dir(&tree) * 1.05;
        tree.tick(viewer);
        let root = tree.forest().roots()[0];
        let children = tree
            .forest()
            .get(root)
            .and_then(|f| f.children)
            .expect("root should split");
        for child in children {
            let face = tree.forest().get(child).expect("child");
            assert_eq!(face.level, 1);
            assert_eq!(face.parent, Some(root));
            assert!(face.normal().dot(face.centroid()) > 0.0, "child winds inward");
        }
    }

    #[test]
    fn test_shared_midpoints_are_bit_identical() {
        let mut tree = quadtree(
            LodSettings {
                lod_multiplier: 2,
                ..LodSettings::default()
            },
            TerrainNoise::new(TerrainParams::default()),
        );
        // Far enough that every base face splits once, but no deeper.
        tree.tick(DVec3::new(0.0, 0.0, 3.0));
        let mesh = tree.rebuild_mesh(&LodView::at(DVec3::new(0.0, 0.0, 3.0)));
        let leaves = mesh.leaf_count;
        assert!(leaves > 20);
        assert!(
            mesh.vertices.len() < leaves * 3 / 2,
            "{} vertices for {leaves} leaves: midpoints did not weld",
            mesh.vertices.len()
        );
    }

    #[test]
    fn test_depth_never_exceeds_max_lod() {
        let mut tree = quadtree(
            LodSettings {
                max_lod: 6,
                ..LodSettings::default()
            },
            flat_terrain(),
        );
        let viewer = first_root_centroid_dir(&tree) * 1.000_001;
        for _ in 0..3 {
            tree.tick(viewer);
        }
        assert_eq!(tree.forest().max_level(), 6);
        assert!(!tree.tick(viewer).changed(), "tree should be stable");
    }

    #[test]
    fn test_base_faces_survive_retreat() {
        let mut tree = quadtree(LodSettings::default(), flat_terrain());
        let roots: Vec<FaceId> = tree.forest().roots().to_vec();
        tree.tick(first_root_centroid_dir(&tree) * 1.01);
        assert!(tree.forest().max_level() > 2);

        let stats = tree.tick(DVec3::new(0.0, 0.0, 100.0));
        assert!(stats.merges > 0);
        assert!(tree.forest().max_level() <= 1);
        for root in roots {
            assert!(tree.forest().contains(root), "base face was freed");
        }
    }

    #[test]
    fn test_hysteresis_band_keeps_children() {
        let mut tree = flat(0, false);
        let dir = first_root_centroid_dir(&tree);
        tree.tick(dir * 1.01);
        let root = tree.forest().roots()[0];
        let centre = tree
            .forest()
            .get(root)
            .and_then(|f| f.children)
            .map(|c| c[0])
            .expect("root split");
        assert!(tree.forest().get(centre).is_some_and(Face::is_expanded));

        // Move out until the centre child's nearest corner sits between the
        // split and merge distances of level 1.
        let face = tree.forest().get(centre).expect("centre").clone();
        let split = tree.thresholds().split_distance(1);
        let merge = tree.thresholds().merge_distance(1).expect("level 1 merges");
        let mut h = 1.0;
        while face.min_corner_distance(dir * h) < split {
            h += 0.001;
        }
        assert!(face.min_corner_distance(dir * h) < merge);
        tree.tick(dir * h);
        assert!(
            tree.forest().get(centre).is_some_and(Face::is_expanded),
            "children merged inside the hysteresis band"
        );

        while face.min_corner_distance(dir * h) < merge {
            h += 0.01;
        }
        tree.tick(dir * h);
        assert!(tree.forest().get(centre).is_some_and(Face::is_leaf));
    }

    #[test]
    fn test_hidden_faces_do_not_split() {
        let mut tree = flat(4, false);
        let dir = first_root_centroid_dir(&tree);
        tree.tick(dir * 1.001);
        let hidden_corner = -dir;
        for (_, face) in tree.forest().iter() {
            if face.level > 1 {
                let nearest = face
                    .corners
                    .iter()
                    .map(|c| c.distance(hidden_corner))
                    .fold(f64::INFINITY, f64::min);
                assert!(nearest > 0.5, "face behind the horizon was refined");
            }
        }
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let mut tree = quadtree(LodSettings::default(), TerrainNoise::new(TerrainParams::default()));
        let view = LodView::at(first_root_centroid_dir(&tree) * 1.02);
        tree.tick(view.viewer);
        let a = tree.rebuild_mesh(&view);
        let b = tree.rebuild_mesh(&view);
        assert_eq!(a.vertices, b.vertices);
        assert_eq!(a.indices, b.indices);
        assert_eq!(a.leaf_count, b.leaf_count);
    }

    #[test]
    fn test_closing_stops_all_changes() {
        let closing = Arc::new(AtomicBool::new(false));
        let mut tree = PlanetQuadtree::new(
            1.0,
            LodSettings::default(),
            TerrainNoise::new(TerrainParams::default()),
            Arc::clone(&closing),
        );
        let viewer = first_root_centroid_dir(&tree) * 1.01;
        closing.store(true, Ordering::Release);

        assert_eq!(tree.tick(viewer), TickStats::default());
        assert_eq!(tree.forest().len(), 20);
        let root = tree.forest().roots()[0];
        assert!(!tree.subdivide(root, viewer));
        assert!(tree.rebuild_mesh(&LodView::at(viewer)).is_empty());
    }

    #[test]
    fn test_screen_culling_drops_faces_behind_camera_view() {
        let mut tree = flat(1, false);
        let eye = DVec3::new(0.0, 0.0, 3.0);
        tree.tick(eye);
        let full = tree.rebuild_mesh(&LodView::at(eye));

        // Narrow view looking sideways, past the planet.
        let view = DMat4::look_at_rh(eye, DVec3::new(10.0, 0.0, 3.0), DVec3::Y);
        let proj = DMat4::perspective_rh(0.3, 1.0, 0.01, 100.0);
        let culled = tree.rebuild_mesh(&LodView {
            viewer: eye,
            view_projection: Some(proj * view),
        });
        assert!(full.triangle_count() > 0);
        assert!(culled.triangle_count() < full.triangle_count());
    }

    #[test]
    fn test_low_viewer_keeps_surface_under_it() {
        let mut tree = quadtree(LodSettings::default(), flat_terrain());
        let dir = first_root_centroid_dir(&tree);
        let view = LodView::at(dir * 1.01);
        for _ in 0..5 {
            tree.tick(view.viewer);
        }
        assert!(tree.forest().max_level() > 2);

        let mesh = tree.rebuild_mesh(&view);
        assert!(mesh.leaf_count > 20);
        assert!(mesh.triangle_count() > 0);
        assert!(mesh_covers(&mesh, dir), "no triangle under the viewer");
    }

    #[test]
    fn test_expanded_face_with_hidden_children_is_drawn_whole() {
        let mut tree = flat(0, false);
        let dir = first_root_centroid_dir(&tree);
        tree.tick(dir * 1.5);
        let root = tree.forest().roots()[0];
        assert!(tree.forest().get(root).is_some_and(Face::is_expanded));

        // From the far side every child of root 0 is below the horizon, but
        // base faces are always drawn.
        let mesh = tree.rebuild_mesh(&LodView::at(-dir * 1.5));
        assert_eq!(mesh.leaf_count, 20);
        assert_eq!(mesh.triangle_count(), 20);
    }
}
