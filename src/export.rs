use crate::colorimetry::{Photometer, SpectralGenerator};
use crate::common::{math::ScalarMinimizer, ExportError, Result, SpectralShape, MITSUBA_SHAPE};
use crate::dataset::DatasetRepository;
use crate::normalize::{KfFamily, Normalization, Normalizer};
use crate::scene::{
    writer::{checked_slug, format_float, slugify, SceneWriter},
    BsdfType, Node, Scene,
};
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

pub const TRAINING_DATASET: &str = "RAW to ACES Utility Data";
pub const TRAINING_ENTRY: &str = "training/190-patch";
pub const ILLUMINANTS_DATASET: &str = "Illuminants";
pub const LIGHT_SOURCES_DATASET: &str = "Light Sources";

pub const DEFAULT_COLOUR_CHECKER: &str = "BabelColor Average";
pub const COLOUR_CHECKERS: [&str; 2] = ["BabelColor Average", "ColorChecker N Ohta"];

pub const DEFAULT_IOR: f64 = 1.46;
pub const DEFAULT_ALPHA: f64 = 0.05;

pub const SUPPORT_PATCH: &str = "white 9.5 (.05 D)";
pub const SUPPORT_SCALE: f64 = 0.025;
pub const SUPPORT_IOR: f64 = 1.46;
pub const SUPPORT_ALPHA: f64 = 0.4;

pub const EMITTERS_FILE: &str = "emitters.xml";
pub const SUPPORT_FILE: &str = "bsdfs_support.xml";
pub const SYNTHETIC_LEDS_FILE: &str = "emitters_synthetic_leds.xml";
pub const SYNTHETIC_BT2020_FILE: &str = "emitters_synthetic_bt2020.xml";

/// Collaborators and configuration shared by every pipeline of one run.
pub struct ExportContext<'a> {
    pub log: slog::Logger,
    pub repository: &'a dyn DatasetRepository,
    pub generator: &'a dyn SpectralGenerator,
    pub photometer: &'a dyn Photometer,
    pub minimizer: &'a dyn ScalarMinimizer,
    pub kf_family: KfFamily,
    pub shape: SpectralShape,
    pub writer: SceneWriter,
}

impl<'a> ExportContext<'a> {
    pub fn new(
        log: &slog::Logger,
        repository: &'a dyn DatasetRepository,
        generator: &'a dyn SpectralGenerator,
        photometer: &'a dyn Photometer,
        minimizer: &'a dyn ScalarMinimizer,
        kf_family: KfFamily,
    ) -> Self {
        let log = log.new(o!("module" => "export"));
        ExportContext {
            log,
            repository,
            generator,
            photometer,
            minimizer,
            kf_family,
            shape: MITSUBA_SHAPE,
            writer: SceneWriter::default(),
        }
    }

    fn normalizer(&self) -> Normalizer<'_> {
        Normalizer::new(self.shape, self.photometer, self.minimizer)
    }

    fn write(&self, scene: Scene, directory: &Path, file_name: &str) -> Result<PathBuf> {
        let path = directory.join(file_name);
        let nodes = scene.len();
        self.writer.write_scene(scene, &path)?;
        info!(self.log, "wrote scene document"; "path" => %path.display(), "nodes" => nodes);
        Ok(path)
    }
}

/// Scene under construction, rejecting ids already present.
struct Document {
    scene: Scene,
    ids: HashSet<String>,
}

impl Document {
    fn new() -> Self {
        Document {
            scene: Scene::new(),
            ids: HashSet::new(),
        }
    }

    fn push(&mut self, node: Node) -> Result<()> {
        if !self.ids.insert(node.id().to_owned()) {
            return Err(ExportError::DuplicateId(node.id().to_owned()));
        }
        self.scene.push(node);
        Ok(())
    }

    fn finish(self) -> Scene {
        self.scene
    }
}

pub fn training_data_file_name(bsdf_type: BsdfType) -> String {
    format!("bsdfs_190_patch_{}.xml", bsdf_type)
}

pub fn build_training_data_bsdfs(
    ctx: &ExportContext,
    bsdf_type: BsdfType,
    ior: f64,
    alpha: f64,
) -> Result<Scene> {
    let dataset = ctx.repository.load(TRAINING_DATASET)?;
    let mut document = Document::new();

    for sd in dataset.get(TRAINING_ENTRY)?.spectra() {
        // patch names read "<patch> - <description>"
        let prefix = sd.name().split('-').next().unwrap_or_default();
        let mut node = Node::new_bsdf(bsdf_type, checked_slug(prefix)?)?;
        node.add_spectrum_param(bsdf_type.reflectance_param(), sd.align(&ctx.shape));
        if bsdf_type.has_ior() {
            node.add_float_param("int_ior", ior);
        }
        if bsdf_type.has_alpha() {
            node.add_float_param("alpha", alpha);
        }
        document.push(node)?;
    }

    Ok(document.finish())
}

pub fn export_training_data_bsdfs(
    ctx: &ExportContext,
    bsdf_type: BsdfType,
    ior: f64,
    alpha: f64,
    directory: &Path,
) -> Result<PathBuf> {
    let scene = build_training_data_bsdfs(ctx, bsdf_type, ior, alpha)?;
    ctx.write(scene, directory, &training_data_file_name(bsdf_type))
}

pub fn colour_checker_file_name(colour_checker: &str) -> Result<String> {
    Ok(format!("bsdfs_{}.xml", checked_slug(colour_checker)?))
}

pub fn build_colour_checker_bsdfs(ctx: &ExportContext, colour_checker: &str) -> Result<Scene> {
    let dataset = ctx.repository.load(colour_checker)?;
    let mut document = Document::new();

    for sd in dataset.spectra() {
        let id = format!("colorchecker_classic_{}", checked_slug(sd.name())?);
        let mut node = Node::new_bsdf(BsdfType::Diffuse, id)?;
        node.add_spectrum_param(
            BsdfType::Diffuse.reflectance_param(),
            sd.align(&ctx.shape),
        );
        document.push(node)?;
    }

    Ok(document.finish())
}

pub fn export_colour_checker_bsdfs(
    ctx: &ExportContext,
    colour_checker: &str,
    directory: &Path,
) -> Result<PathBuf> {
    let scene = build_colour_checker_bsdfs(ctx, colour_checker)?;
    ctx.write(scene, directory, &colour_checker_file_name(colour_checker)?)
}

/// Calibrated white backing the colour checker sits on.
pub fn build_colour_checker_support_bsdf(ctx: &ExportContext) -> Result<Scene> {
    let dataset = ctx.repository.load(DEFAULT_COLOUR_CHECKER)?;
    let white = dataset.spectrum(SUPPORT_PATCH)?.align(&ctx.shape) * SUPPORT_SCALE;

    let mut node = Node::new_bsdf(BsdfType::RoughPlastic, "colorchecker_classic_support")?;
    node.add_spectrum_param(BsdfType::RoughPlastic.reflectance_param(), white)
        .add_float_param("int_ior", SUPPORT_IOR)
        .add_float_param("alpha", SUPPORT_ALPHA);

    let mut document = Document::new();
    document.push(node)?;
    Ok(document.finish())
}

pub fn export_colour_checker_support_bsdf(ctx: &ExportContext, directory: &Path) -> Result<PathBuf> {
    let scene = build_colour_checker_support_bsdf(ctx)?;
    ctx.write(scene, directory, SUPPORT_FILE)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmitterCategory {
    Illuminant,
    LightSource,
}

impl EmitterCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmitterCategory::Illuminant => "illuminant",
            EmitterCategory::LightSource => "light_source",
        }
    }

    pub fn dataset(&self) -> &'static str {
        match self {
            EmitterCategory::Illuminant => ILLUMINANTS_DATASET,
            EmitterCategory::LightSource => LIGHT_SOURCES_DATASET,
        }
    }

    /// Illuminants are already on a comparable relative scale and are exported
    /// unscaled under every `K_f`; only light sources are energy normalized.
    pub fn normalization(&self) -> Normalization {
        match self {
            EmitterCategory::Illuminant => Normalization::Passthrough,
            EmitterCategory::LightSource => Normalization::Energy,
        }
    }
}

pub fn emitter_id(category: EmitterCategory, name: &str, k_f: f64) -> Result<String> {
    Ok(format!(
        "{}_{}_kf_{}",
        category.as_str(),
        checked_slug(name)?,
        slugify(&format_float(k_f))
    ))
}

pub fn build_emitters(ctx: &ExportContext) -> Result<Scene> {
    let normalizer = ctx.normalizer();
    let k_fs = ctx.kf_family.values();
    let mut document = Document::new();

    for category in &[EmitterCategory::Illuminant, EmitterCategory::LightSource] {
        let dataset = ctx.repository.load(category.dataset())?;
        debug!(ctx.log, "exporting emitters"; "category" => category.as_str(), "spectra" => dataset.spectra().len());

        for sd in dataset.spectra() {
            let sd = sd.align(&ctx.shape);
            for &k_f in &k_fs {
                let radiance = normalizer.normalize(&sd, category.normalization(), k_f)?;
                let mut node = Node::new_emitter(emitter_id(*category, sd.name(), k_f)?)?;
                node.add_spectrum_param("radiance", radiance);
                document.push(node)?;
            }
        }
    }

    Ok(document.finish())
}

pub fn export_emitters(ctx: &ExportContext, directory: &Path) -> Result<PathBuf> {
    let scene = build_emitters(ctx)?;
    ctx.write(scene, directory, EMITTERS_FILE)
}

/// Family of synthetic narrow band emitters.
#[derive(Clone, Debug, PartialEq)]
pub struct SyntheticLeds {
    pub wavelengths: Vec<f64>,
    pub fwhm: f64,
    /// Match every emitter to the luminous flux of a peak at `reference_wavelength`.
    pub flux_normalize: bool,
    pub reference_wavelength: f64,
    /// Factor applied to the context `K_f` family.
    pub kf_scale: f64,
}

impl SyntheticLeds {
    /// 450 nm to 640 nm every 10 nm.
    pub fn leds() -> Self {
        SyntheticLeds {
            wavelengths: (0..20).map(|i| 450.0 + 10.0 * i as f64).collect(),
            fwhm: 20.0,
            flux_normalize: false,
            reference_wavelength: 555.0,
            kf_scale: 1.0 / 20.0,
        }
    }

    /// ITU-R BT.2020 monochromatic primaries.
    pub fn bt2020() -> Self {
        SyntheticLeds {
            wavelengths: vec![630.0, 532.0, 467.0],
            flux_normalize: true,
            ..Self::leds()
        }
    }
}

pub fn build_synthetic_emitters(ctx: &ExportContext, leds: &SyntheticLeds) -> Result<Scene> {
    let normalizer = ctx.normalizer();
    let k_fs = ctx.kf_family.scaled(leds.kf_scale).values();

    let normalization = if leds.flux_normalize {
        let reference = ctx
            .generator
            .single_peak(leds.reference_wavelength, leds.fwhm)?
            .align(&ctx.shape);
        let target = ctx.photometer.luminous_flux(&reference);
        debug!(ctx.log, "luminous flux target"; "reference" => reference.name(), "flux" => target);
        Normalization::Flux { target }
    } else {
        Normalization::Energy
    };

    let mut document = Document::new();
    for &wavelength in &leds.wavelengths {
        let sd = ctx
            .generator
            .single_peak(wavelength, leds.fwhm)?
            .align(&ctx.shape);
        for &k_f in &k_fs {
            let radiance = normalizer.normalize(&sd, normalization, k_f)?;
            let id = emitter_id(EmitterCategory::LightSource, sd.name(), k_f)?;
            let mut node = Node::new_emitter(id)?;
            node.add_spectrum_param("radiance", radiance);
            document.push(node)?;
        }
    }

    Ok(document.finish())
}

pub fn export_synthetic_emitters(
    ctx: &ExportContext,
    leds: &SyntheticLeds,
    directory: &Path,
    file_name: &str,
) -> Result<PathBuf> {
    let scene = build_synthetic_emitters(ctx, leds)?;
    ctx.write(scene, directory, file_name)
}

/// Where each group of documents is written.
#[derive(Clone, Debug)]
pub struct OutputDirectories {
    pub include: PathBuf,
    pub colour_checker: PathBuf,
}

impl Default for OutputDirectories {
    fn default() -> Self {
        OutputDirectories {
            include: PathBuf::from("include"),
            colour_checker: PathBuf::from("colorchecker_classic/include"),
        }
    }
}

/// Runs every pipeline in sequence, stopping at the first failure.
pub fn export_all(ctx: &ExportContext, directories: &OutputDirectories) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for bsdf_type in BsdfType::ALL.iter() {
        written.push(export_training_data_bsdfs(
            ctx,
            *bsdf_type,
            DEFAULT_IOR,
            DEFAULT_ALPHA,
            &directories.include,
        )?);
    }

    for colour_checker in COLOUR_CHECKERS.iter() {
        written.push(export_colour_checker_bsdfs(
            ctx,
            colour_checker,
            &directories.colour_checker,
        )?);
    }
    written.push(export_colour_checker_support_bsdf(
        ctx,
        &directories.colour_checker,
    )?);

    written.push(export_emitters(ctx, &directories.include)?);
    written.push(export_synthetic_emitters(
        ctx,
        &SyntheticLeds::leds(),
        &directories.include,
        SYNTHETIC_LEDS_FILE,
    )?);
    written.push(export_synthetic_emitters(
        ctx,
        &SyntheticLeds::bt2020(),
        &directories.include,
        SYNTHETIC_BT2020_FILE,
    )?);

    Ok(written)
}
