use crate::domain::model::QualityTier;

const MEDIUM_INSTRUCTION: &str = "Remove the background from this image quickly. \
The output must be a PNG with a transparent background. \
Keep the subject's identity and features unchanged and do not add any new elements. \
Fast processing is more important than perfect edge detail.";

const HIGH_INSTRUCTION: &str = "Remove the background from this image. \
The output must be a PNG with a transparent background. \
Keep the original subject, including all details like hair and fine edges, perfectly intact. \
Do not add any new elements or change the subject. Just remove the background.";

const ULTRA_INSTRUCTION: &str = "Perform an expert-level background removal on this image. \
The output must be a lossless PNG with a transparent background. \
Preserve every single detail of the original subject, especially intricate details like \
individual strands of hair, fur, and complex edges. \
The cutout should be flawless and of professional studio quality, with no halos or artifacts. \
The subject's face and features must remain 100% unchanged and no new elements may be added.";

const ORIGINAL_INSTRUCTION: &str = "Perform an expert-level background removal on this image. \
The output must be a lossless PNG with a transparent background, \
maintaining the original image's resolution and dimensions exactly. \
Preserve every single detail of the original subject, especially intricate details like \
individual strands of hair, fur, and complex edges, with no halos or artifacts. \
The subject's face and features must remain 100% unchanged and no new elements may be added. \
Do not resize the image or apply any lossy compression; \
maximum data retention matters more than file size.";

/// Instruction sent to the model for each quality tier.
pub fn instruction_for(quality: QualityTier) -> &'static str {
    match quality {
        QualityTier::Medium => MEDIUM_INSTRUCTION,
        QualityTier::High => HIGH_INSTRUCTION,
        QualityTier::Ultra => ULTRA_INSTRUCTION,
        QualityTier::Original => ORIGINAL_INSTRUCTION,
    }
}
