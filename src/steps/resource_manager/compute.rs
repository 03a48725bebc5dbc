//! Virtual machines with their images and managed disks

use crate::core::{Step, StepFamily, StepGroup, StepHandler, StepId};
use crate::graph::{EntityMeta, RelationshipClass};
use crate::steps::handlers::{ChainStep, LinkRule, LinkStep};
use crate::steps::resource_manager::{provider, scoped_deps};
use std::sync::Arc;

pub const STEP_RM_COMPUTE_VIRTUAL_MACHINE_IMAGES: StepId =
    StepId::new("rm-compute-virtual-machine-images");
pub const STEP_RM_COMPUTE_VIRTUAL_MACHINE_DISKS: StepId =
    StepId::new("rm-compute-virtual-machine-disks");
pub const STEP_RM_COMPUTE_VIRTUAL_MACHINES: StepId = StepId::new("rm-compute-virtual-machines");

const API_VERSION: &str = "2019-12-01";

pub static VIRTUAL_MACHINE: EntityMeta = EntityMeta::new("Virtual Machine", "azure_vm", "Host");
pub static IMAGE: EntityMeta = EntityMeta::new("Image", "azure_image", "Image");
pub static DISK: EntityMeta = EntityMeta::new("Managed Disk", "azure_managed_disk", "DataStore");

fn virtual_machines() -> ChainStep {
    let list: Arc<dyn StepHandler> = Arc::new(provider(
        "providers/Microsoft.Compute/virtualMachines",
        API_VERSION,
        &VIRTUAL_MACHINE,
    ));
    let link: Arc<dyn StepHandler> = Arc::new(LinkStep::new(vec![
        LinkRule::new(
            &VIRTUAL_MACHINE,
            "properties.storageProfile.osDisk.managedDisk.id",
            RelationshipClass::Uses,
            vec![&DISK],
        ),
        LinkRule::new(
            &VIRTUAL_MACHINE,
            "properties.storageProfile.dataDisks.*.managedDisk.id",
            RelationshipClass::Uses,
            vec![&DISK],
        ),
        LinkRule::new(
            &VIRTUAL_MACHINE,
            "properties.storageProfile.imageReference.id",
            RelationshipClass::Uses,
            vec![&IMAGE],
        ),
    ]));
    ChainStep::new(vec![list, link])
}

pub fn family() -> StepFamily {
    StepFamily::new(
        "compute",
        StepGroup::ResourceScope,
        vec![
            Step::new(
                STEP_RM_COMPUTE_VIRTUAL_MACHINE_IMAGES,
                "Virtual Machine Images",
                provider("providers/Microsoft.Compute/images", API_VERSION, &IMAGE),
            )
            .depends_on(scoped_deps(&[])),
            Step::new(
                STEP_RM_COMPUTE_VIRTUAL_MACHINE_DISKS,
                "Virtual Machine Disks",
                provider("providers/Microsoft.Compute/disks", API_VERSION, &DISK),
            )
            .depends_on(scoped_deps(&[])),
            Step::new(STEP_RM_COMPUTE_VIRTUAL_MACHINES, "Virtual Machines", virtual_machines())
                .depends_on(scoped_deps(&[
                    STEP_RM_COMPUTE_VIRTUAL_MACHINE_IMAGES,
                    STEP_RM_COMPUTE_VIRTUAL_MACHINE_DISKS,
                ])),
        ],
    )
}
