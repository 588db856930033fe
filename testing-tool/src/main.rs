use colored::*;
use serde_json::{json, Value};
use std::io::{self, Write};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "🛵 Fast Order Testing Tool".bright_blue().bold());
    println!("{}", "=====================================".bright_blue());
    println!();

    // Paso 1: Pedir servidor y credenciales
    let credentials = get_credentials()?;
    let client = reqwest::Client::new();

    // Paso 2: Autenticarse y obtener token
    let token = authenticate(&client, &credentials).await?;

    // Paso 3: Menú principal
    loop {
        println!();
        println!("{}", "📋 MENÚ PRINCIPAL".bright_green().bold());
        println!("{}", "==================".bright_green());
        println!("1. 📝 Crear pedido de prueba");
        println!("2. 📦 Ver tablero del día");
        println!("3. ⏩ Avanzar un pedido");
        println!("4. 🚪 Salir");
        print!("{}", "Selecciona una opción (1-4): ".bright_yellow());
        io::stdout().flush()?;

        let choice = read_line()?;
        match choice.as_str() {
            "1" => create_test_order(&client, &credentials, &token).await?,
            "2" => show_board(&client, &credentials, &token).await?,
            "3" => {
                print!("{}", "ID del pedido: ".bright_yellow());
                io::stdout().flush()?;
                let id = read_line()?;
                advance_order(&client, &credentials, &token, &id).await?;
            }
            "4" => {
                println!("{}", "👋 ¡Hasta luego!".bright_green());
                break;
            }
            _ => {
                println!("{}", "❌ Opción inválida. Intenta de nuevo.".bright_red());
            }
        }
    }

    Ok(())
}

fn read_line() -> Result<String, Box<dyn std::error::Error>> {
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn get_credentials() -> Result<Credentials, Box<dyn std::error::Error>> {
    println!("{}", "🔐 CREDENCIALES DE FAST ORDER".bright_cyan().bold());
    println!("{}", "===============================".bright_cyan());

    print!("{}", "Servidor (ej: http://localhost:3000): ".bright_yellow());
    io::stdout().flush()?;
    let mut base_url = read_line()?;
    if base_url.is_empty() {
        base_url = "http://localhost:3000".to_string();
    }

    print!("{}", "Email: ".bright_yellow());
    io::stdout().flush()?;
    let email = read_line()?;

    print!("{}", "Password: ".bright_yellow());
    io::stdout().flush()?;
    let password = read_line()?;

    Ok(Credentials {
        base_url: base_url.trim_end_matches('/').to_string(),
        email,
        password,
    })
}

async fn authenticate(
    client: &reqwest::Client,
    credentials: &Credentials,
) -> Result<String, Box<dyn std::error::Error>> {
    println!();
    println!("{}", "🔐 AUTENTICANDO...".bright_cyan().bold());

    let url = format!("{}/api/auth/login", credentials.base_url);
    let payload = json!({
        "email": credentials.email,
        "password": credentials.password,
    });

    let body = send(client.post(&url).json(&payload)).await?;
    match body["data"]["token"].as_str() {
        Some(token) => {
            println!("{}", "✅ Sesión iniciada".bright_green().bold());
            Ok(token.to_string())
        }
        None => Err("❌ No se pudo extraer el token de la respuesta".into()),
    }
}

async fn create_test_order(
    client: &reqwest::Client,
    credentials: &Credentials,
    token: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    println!();
    println!("{}", "📝 CREANDO PEDIDO DE PRUEBA...".bright_cyan().bold());

    let payload = json!({
        "invoices": [
            { "code": "FV-TEST-1", "value": "$ 25,000" },
            { "code": "FV-TEST-2", "value": "12.500" }
        ],
        "client_name": "CLIENTE DE PRUEBA",
        "delivery_type": "DOMICILIO",
        "delivery_address": "calle falsa 123",
        "observations": "pedido generado por testing-tool"
    });

    println!("{}", "📦 Payload:".bright_blue());
    println!("{}", serde_json::to_string_pretty(&payload)?);

    let url = format!("{}/api/orders", credentials.base_url);
    let body = send(client.post(&url).bearer_auth(token).json(&payload)).await?;
    if let Some(order) = body.get("data") {
        println!(
            "{} {} ({})",
            "✅ Pedido creado:".bright_green().bold(),
            order["public_id"].as_str().unwrap_or("?"),
            order["id"].as_str().unwrap_or("?")
        );
    }
    Ok(())
}

async fn show_board(
    client: &reqwest::Client,
    credentials: &Credentials,
    token: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let url = format!("{}/api/orders", credentials.base_url);
    let body = send(client.get(&url).bearer_auth(token)).await?;

    let data = &body["data"];
    println!();
    println!("{}", "📊 ESTADÍSTICAS:".bright_green().bold());
    println!("{}", serde_json::to_string_pretty(&data["stats"])?);

    if let Some(orders) = data["orders"].as_array() {
        println!(
            "{}",
            format!("📦 PEDIDOS DEL DÍA: {}", orders.len()).bright_green().bold()
        );
        for order in orders {
            println!(
                "   {} {:<10} {:<25} {}",
                order["public_id"].as_str().unwrap_or("?"),
                order["status"].as_str().unwrap_or("?"),
                order["client_name"].as_str().unwrap_or("?"),
                order["id"].as_str().unwrap_or("?")
            );
        }
    }
    Ok(())
}

async fn advance_order(
    client: &reqwest::Client,
    credentials: &Credentials,
    token: &str,
    id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let url = format!("{}/api/orders/{}/advance", credentials.base_url, id);
    let body = send(client.post(&url).bearer_auth(token)).await?;
    if let Some(status) = body["data"]["status"].as_str() {
        println!("{} {}", "✅ Nuevo estado:".bright_green().bold(), status);
    }
    Ok(())
}

/// Envía la request y muestra el status y el body
async fn send(request: reqwest::RequestBuilder) -> Result<Value, Box<dyn std::error::Error>> {
    let response = request.send().await?;
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if status.is_success() {
        println!("{} {}", "📥 Status:".bright_blue(), status);
    } else {
        println!("{} {}", "❌ Status:".bright_red(), status);
        println!("{}", serde_json::to_string_pretty(&body)?);
    }
    Ok(body)
}

#[derive(Debug)]
struct Credentials {
    base_url: String,
    email: String,
    password: String,
}
