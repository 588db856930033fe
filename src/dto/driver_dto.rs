use serde::Deserialize;
use validator::Validate;

// Request para crear un domiciliario
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDriverRequest {
    #[validate(length(min = 1, max = 120, message = "El nombre del domiciliario es obligatorio."))]
    pub full_name: String,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(length(max = 20))]
    pub vehicle_plate: Option<String>,
}
