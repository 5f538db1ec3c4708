use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_scheduled: bool,
    pub is_seeking_teachers: bool,
    pub created_at: String,
}

/// Volunteer instructor, created by the public application form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VolunteerTeacher {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub university: Option<String>,
    pub course: Option<String>,
    pub availability: Option<String>,
    /// Subject names, not ids
    pub subjects_can_teach: Vec<String>,
    pub motivation: Option<String>,
    pub registration_number: String,
    pub photo_url: Option<String>,
    pub academic_history_url: String,
    pub status: String,
    pub approved: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl VolunteerTeacher {
    pub const PENDING_STATUS: &'static str = "pending";
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailTemplate {
    pub subject: String,
    pub body: String,
    pub signature: String,
}

impl Default for EmailTemplate {
    fn default() -> Self {
        Self {
            subject: "Lembrete: {TITULO_AULAO} - {DATA}".to_string(),
            body: "Olá!\n\n\
Esperamos você no aulão \"{TITULO_AULAO}\" que acontecerá:\n\n\
📅 Data: {DATA}\n\
⏰ Horário: {HORARIO_INICIO} às {HORARIO_FIM}\n\
📍 Local: {LOCAL}\n\
📚 Matéria: {MATERIA}\n\
👨‍🏫 Ministrante: {MINISTRANTE}\n\n\
🎯 Tópicos que serão abordados:\n\
{TOPICOS}\n\n\
📋 Materiais necessários:\n\
{MATERIAIS}\n\n\
Não se esqueça de trazer sua doação conforme combinado na inscrição.\n\n\
Nos vemos lá!"
                .to_string(),
            signature: "Equipe Aulão Solidário\nEducação que transforma vidas! 💙".to_string(),
        }
    }
}
