//! Command-line overrides, one flag per settings field.
//!
//! Flag names match the settings file keys so a GUI host can pass its form
//! values straight through (`--Pize_A 0.83`).

use super::{PretrainedModel, Settings};
use clap::Args;

/// Optional per-field overrides; unset flags leave the loaded value alone.
#[derive(Debug, Clone, Default, Args)]
pub struct SettingsOverrides {
    /// CryoSPARC license ID
    #[arg(long = "License", help_heading = "User Info")]
    pub license: Option<String>,
    /// Number of CPUs to use for computation
    #[arg(long = "Compute_num_cpus", help_heading = "User Info")]
    pub compute_num_cpus: Option<u32>,
    /// CryoSPARC account
    #[arg(long = "Email", help_heading = "User Info")]
    pub email: Option<String>,
    /// CryoSPARC password
    #[arg(long = "Password", help_heading = "User Info")]
    pub password: Option<String>,
    /// CryoSPARC host address
    #[arg(long = "Host", help_heading = "User Info")]
    pub host: Option<String>,
    /// CryoSPARC base port number
    #[arg(long = "Port", help_heading = "User Info")]
    pub port: Option<u16>,
    /// CryoSPARC project ID
    #[arg(long = "Project_ID", help_heading = "User Info")]
    pub project_id: Option<String>,
    /// CryoSPARC workspace title
    #[arg(long = "Workspace_title", help_heading = "User Info")]
    pub workspace_title: Option<String>,
    /// CryoSPARC workspace description
    #[arg(long = "Workspace_desc", help_heading = "User Info")]
    pub workspace_desc: Option<String>,

    /// Absolute path or wildcard expression of the micrographs to import
    #[arg(long = "Micrographs_data_path", help_heading = "Import Micrographs")]
    pub micrographs_data_path: Option<String>,
    /// Pixel size of the micrograph data in Angstroms
    #[arg(long = "Pize_A", help_heading = "Import Micrographs")]
    pub psize_a: Option<f64>,
    /// Acceleration voltage in kV
    #[arg(long = "Accel_kv", help_heading = "Import Micrographs")]
    pub accel_kv: Option<f64>,
    /// Spherical aberration in mm
    #[arg(long = "Cs_mm", help_heading = "Import Micrographs")]
    pub cs_mm: Option<f64>,
    /// Dose per exposure in e/A^2
    #[arg(long = "Dose_eA2", help_heading = "Import Micrographs")]
    pub dose_e_a2: Option<f64>,

    /// Absolute path to a Topaz executable built for the installed CUDA version
    #[arg(long = "Exec_path", help_heading = "Topaz Extract")]
    pub exec_path: Option<String>,
    /// Pretrained model to use for extraction
    #[arg(long = "Pretrained", help_heading = "Topaz Extract")]
    pub pretrained: Option<PretrainedModel>,
    /// Factor to downsample micrographs by before picking
    #[arg(long = "Downsample_scale", help_heading = "Topaz Extract")]
    pub downsample_scale: Option<u32>,
    /// Radius of regions to extract; negative derives it from the other radius parameters
    #[arg(long = "Extract_radius", help_heading = "Topaz Extract", allow_negative_numbers = true)]
    pub extract_radius: Option<i32>,
    /// Size of the box extracted around each particle, in pixels
    #[arg(long = "Box_size_pix", help_heading = "Topaz Extract")]
    pub box_size_pix: Option<u32>,

    /// Number of 2D classes
    #[arg(long = "Class2D_K", help_heading = "2D Classification")]
    pub class2d_k: Option<u32>,

    /// Symmetry string (C, D, I, O, T), e.g. C1, D7, C4
    #[arg(long = "Refine_symmetry", help_heading = "Homogeneous Refinement")]
    pub refine_symmetry: Option<String>,
    /// Minimize over per-particle defocus at each refinement iteration
    #[arg(long = "Refine_defocus_refine", help_heading = "Homogeneous Refinement")]
    pub refine_defocus_refine: Option<bool>,
    /// Optimize per-exposure-group CTF parameters at each refinement iteration
    #[arg(long = "Refine_ctf_global_refine", help_heading = "Homogeneous Refinement")]
    pub refine_ctf_global_refine: Option<bool>,
}

fn set<T: Clone>(target: &mut T, value: Option<&T>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}

impl SettingsOverrides {
    /// Writes every set override into `settings`.
    pub fn apply_to(&self, settings: &mut Settings) {
        set(&mut settings.license, self.license.as_ref());
        set(&mut settings.compute_num_cpus, self.compute_num_cpus.as_ref());
        set(&mut settings.email, self.email.as_ref());
        set(&mut settings.password, self.password.as_ref());
        set(&mut settings.host, self.host.as_ref());
        set(&mut settings.port, self.port.as_ref());
        set(&mut settings.project_id, self.project_id.as_ref());
        set(&mut settings.workspace_title, self.workspace_title.as_ref());
        set(&mut settings.workspace_desc, self.workspace_desc.as_ref());
        set(&mut settings.micrographs_data_path, self.micrographs_data_path.as_ref());
        if let Some(psize_a) = self.psize_a {
            settings.psize_a = Some(psize_a);
        }
        set(&mut settings.accel_kv, self.accel_kv.as_ref());
        set(&mut settings.cs_mm, self.cs_mm.as_ref());
        set(&mut settings.dose_e_a2, self.dose_e_a2.as_ref());
        set(&mut settings.exec_path, self.exec_path.as_ref());
        set(&mut settings.pretrained, self.pretrained.as_ref());
        set(&mut settings.downsample_scale, self.downsample_scale.as_ref());
        set(&mut settings.extract_radius, self.extract_radius.as_ref());
        set(&mut settings.box_size_pix, self.box_size_pix.as_ref());
        set(&mut settings.class2d_k, self.class2d_k.as_ref());
        set(&mut settings.refine_symmetry, self.refine_symmetry.as_ref());
        set(&mut settings.refine_defocus_refine, self.refine_defocus_refine.as_ref());
        set(&mut settings.refine_ctf_global_refine, self.refine_ctf_global_refine.as_ref());
    }
}
