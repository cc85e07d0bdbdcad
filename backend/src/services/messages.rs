//! User-facing messages returned in response bodies.

pub const DATES_REQUIRED: &str = "Veuillez fournir les dates de recherche.";
pub const INVALID_DATE_FORMAT: &str = "Format de date invalide. Utilisez le format YYYY-MM-DD.";
pub const DEPARTURE_NOT_AFTER_ARRIVAL: &str =
    "La date de départ doit être postérieure à la date d'arrivée.";
pub const INVALID_PRICE: &str = "Le prix doit être un nombre positif.";
pub const INVALID_ID: &str = "Identifiant invalide.";

pub const ROOM_NOT_FOUND: &str = "Chambre non trouvée.";
pub const RESERVATION_NOT_FOUND: &str = "Réservation non trouvée.";
pub const CLIENT_NOT_FOUND: &str = "Client non trouvé.";

pub const ROOM_UNAVAILABLE: &str = "La chambre n'est pas disponible pour les dates demandées.";
pub const EMAIL_TAKEN: &str = "Un client avec cet email existe déjà.";
pub const ROOM_NUMBER_TAKEN: &str = "Une chambre avec ce numéro existe déjà.";

pub const INTERNAL_ERROR: &str = "Erreur interne du serveur.";

pub const RESERVATION_CREATED: &str = "Réservation créée avec succès.";
pub const RESERVATION_CANCELLED: &str = "Réservation annulée avec succès.";
pub const ROOM_ADDED: &str = "Chambre ajoutée avec succès.";
pub const ROOM_UPDATED: &str = "Chambre mise à jour avec succès.";
pub const ROOM_DELETED: &str = "Chambre supprimée avec succès.";
pub const CLIENT_CREATED: &str = "Client créé avec succès.";

/// Message for a required body field that was absent or `null`.
pub fn missing_field(field: &str) -> String {
    format!("Le champ {} est requis dans le corps de la requête.", field)
}

/// Message for a body that could not be decoded.
pub fn invalid_body(detail: impl std::fmt::Display) -> String {
    format!("Corps de requête invalide: {}", detail)
}
