use serde::{Deserialize, Serialize};

/// Fixed instruction sent with every describer call. Names the schema the normalizer expects.
pub const DAMAGE_INSTRUCTION_PROMPT: &str = "Du bist ein erfahrener KFZ-Gutachter. Analysiere die Fotos \
des Fahrzeugs in der gegebenen Reihenfolge und antworte ausschließlich mit einem JSON-Objekt mit den Feldern: \
bauteil, schadensanalyse, schweregrad (1-10), reparaturweg, \
teile_zu_ersetzen [{teil, grund, beleg, konfidenz}], teile_zu_pruefen [{teil, verdacht, pruefmethode, konfidenz}], \
kosten_schaetzung_aed {teile_range, arbeit_range, gesamt_range} jeweils als {low, mid, high}, \
kosten_schaetzung_eur {gesamt_range, wechselkurs}, arbeitsstunden {stunden_range, positionen [{bezeichnung, stunden}]}, \
standort_tipp, fahrbereit (YES/NO/UNKNOWN), risiko_flags [], betroffene_teile [].";

/// One photo as the describer receives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriberImage {
    pub media_type: String,
    /// Base64 payload or a URL the describer can fetch.
    pub data: String,
}

/// Ordered images plus the fixed instruction prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriberRequest {
    pub images: Vec<DescriberImage>,
    pub instruction: &'static str,
}

impl DescriberRequest {
    pub fn new(images: Vec<DescriberImage>) -> Self {
        Self {
            images,
            instruction: DAMAGE_INSTRUCTION_PROMPT,
        }
    }
}

/// Boundary to the external vision service. Implementations own retries and model fallback.
pub trait DamageDescriber: Send + Sync {
    fn describe(&self, request: &DescriberRequest) -> Result<String, DescriberError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DescriberError {
    #[error("no images supplied")]
    NoImages,
    #[error("describer unavailable: {0}")]
    Unavailable(String),
}
