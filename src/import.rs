//! Bulk provider import from tabular data.
//!
//! The byte-to-rows decode is a collaborator seam: `import_rows` works
//! over already-decoded string-keyed rows, `import_providers` plugs in
//! the CSV decoder. Structural problems (empty file, missing columns)
//! abort the import; row problems skip the row and keep going.

use std::collections::{BTreeSet, HashMap};

use crate::ids::IdGenerator;
use crate::location::{extract_coordinates, is_valid_location_url};
use crate::provider::{ImportResult, Provider, UNCATEGORIZED};

/// Logical fields whose columns must exist in the header row.
pub const REQUIRED_FIELDS: &[&str] =
    &["nombre_proveedor", "ciudad", "provincia", "url_maps_ubicacion"];

/// A decoded sheet row: raw header → raw cell value. Blank cells come
/// through as empty strings.
pub type SheetRow = HashMap<String, String>;

/// Import providers from raw CSV bytes.
pub fn import_providers(bytes: &[u8], ids: &mut dyn IdGenerator) -> ImportResult {
    match decode_rows(bytes) {
        Ok(rows) => import_rows(&rows, ids),
        Err(e) => ImportResult::failed(format!("Error al procesar el archivo: {}", e)),
    }
}

/// Import providers from decoded rows (the collaborator seam).
pub fn import_rows(rows: &[SheetRow], ids: &mut dyn IdGenerator) -> ImportResult {
    if rows.is_empty() {
        return ImportResult::failed("El archivo está vacío");
    }

    // Column-presence check against the header set. Any required field
    // missing aborts before any row is processed.
    let header_keys: BTreeSet<String> = rows[0].keys().map(|k| normalize_key(k)).collect();
    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|f| !header_keys.contains(*f))
        .collect();
    if !missing.is_empty() {
        return ImportResult::failed(format!(
            "Faltan columnas obligatorias: {}",
            missing.join(", "),
        ));
    }

    let mut providers: Vec<Provider> = Vec::new();
    let mut errors: Vec<String> = Vec::new();
    let mut categories: BTreeSet<String> = BTreeSet::new();

    for (index, row) in rows.iter().enumerate() {
        // Header row is row 1, so the first data row reports as 2.
        let row_num = index + 2;

        let row: HashMap<String, String> = row
            .iter()
            .map(|(k, v)| (normalize_key(k), v.trim().to_string()))
            .collect();

        let nombre_proveedor = field(&row, &["nombre_proveedor", "proveedor"]);
        let nombre_contacto = field(&row, &["nombre_contacto", "contacto"]);
        let numero_celular = field(&row, &["numero_celular", "celular", "telefono"]);
        let ciudad = field(&row, &["ciudad"]);
        let provincia = field(&row, &["provincia"]);
        let url_maps = field(&row, &["url_maps_ubicacion", "url_maps", "ubicacion"]);
        let mut categoria = field(&row, &["categoria_linea", "categoria", "linea"]);
        if categoria.is_empty() {
            categoria = UNCATEGORIZED.to_string();
        }

        if nombre_proveedor.is_empty() {
            errors.push(format!("Fila {}: nombre_proveedor está vacío", row_num));
            continue;
        }
        if ciudad.is_empty() {
            errors.push(format!("Fila {}: ciudad está vacía", row_num));
            continue;
        }
        if provincia.is_empty() {
            errors.push(format!("Fila {}: provincia está vacía", row_num));
            continue;
        }
        if url_maps.is_empty() {
            errors.push(format!("Fila {}: url_maps_ubicacion está vacía", row_num));
            continue;
        }

        if !is_valid_location_url(&url_maps) {
            errors.push(format!(
                "Fila {}: URL de Google Maps no válida para \"{}\"",
                row_num, nombre_proveedor,
            ));
            continue;
        }

        let coords = match extract_coordinates(&url_maps) {
            Some(c) => c,
            None => {
                errors.push(format!(
                    "Fila {}: No se pudieron extraer coordenadas de la URL para \"{}\"",
                    row_num, nombre_proveedor,
                ));
                continue;
            }
        };
        if !coords.is_valid() {
            errors.push(format!(
                "Fila {}: Coordenadas fuera de rango para \"{}\"",
                row_num, nombre_proveedor,
            ));
            continue;
        }

        categories.insert(categoria.clone());

        providers.push(Provider {
            id: ids.next_id(),
            nombre_proveedor,
            nombre_contacto,
            numero_celular,
            ciudad,
            provincia,
            url_maps_ubicacion: url_maps,
            categoria,
            lat: coords.lat,
            lng: coords.lng,
            distance: None,
        });
    }

    let mut warnings: Vec<String> = Vec::new();
    if providers.iter().any(|p| p.nombre_contacto.is_empty()) {
        warnings.push("Algunos proveedores no tienen nombre_contacto".to_string());
    }
    if providers.iter().any(|p| p.numero_celular.is_empty()) {
        warnings.push("Algunos proveedores no tienen numero_celular".to_string());
    }

    ImportResult {
        success: !providers.is_empty(),
        providers,
        errors,
        warnings,
        categories: categories.into_iter().collect(),
    }
}

/// Lowercase, trim, and collapse whitespace runs to underscores so
/// "Nombre Proveedor" and "nombre_proveedor" name the same column.
fn normalize_key(key: &str) -> String {
    key.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// First non-empty value among the given keys, in order.
fn field(row: &HashMap<String, String>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|k| row.get(*k))
        .find(|v| !v.is_empty())
        .cloned()
        .unwrap_or_default()
}

/// Decode CSV bytes into string-keyed rows, first sheet semantics:
/// header row first, blank cells as empty strings, ragged rows allowed.
fn decode_rows(bytes: &[u8]) -> Result<Vec<SheetRow>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers().map_err(|e| e.to_string())?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        let mut row = SheetRow::new();
        for (i, header) in headers.iter().enumerate() {
            row.insert(header.to_string(), record.get(i).unwrap_or("").to_string());
        }
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;

    const VALID_URL: &str = "https://maps.google.com/?q=-34.9214,-57.9544";

    fn import(csv: &str) -> ImportResult {
        let mut ids = SequentialIds::new("p");
        import_providers(csv.as_bytes(), &mut ids)
    }

    #[test]
    fn test_import_valid_rows() {
        let csv = format!(
            "nombre_proveedor,nombre_contacto,numero_celular,ciudad,provincia,url_maps_ubicacion,categoria_linea\n\
             Frigorífico Sur,Ana,221-555-0101,La Plata,Buenos Aires,\"{u}\",Carnes\n\
             Verdulería Centro,Luis,341-555-0202,Rosario,Santa Fe,\"{u}\",Frutas y Verduras\n",
            u = VALID_URL,
        );
        let result = import(&csv);

        assert!(result.success);
        assert_eq!(result.providers.len(), 2);
        assert!(result.errors.is_empty());
        assert_eq!(result.providers[0].id, "p-1");
        assert_eq!(result.providers[1].id, "p-2");
        assert_eq!(result.providers[0].lat, -34.9214);
        assert_eq!(result.categories, vec!["Carnes", "Frutas y Verduras"]);
    }

    #[test]
    fn test_import_missing_required_column_aborts() {
        let csv = format!(
            "nombre_proveedor,provincia,url_maps_ubicacion\nX,BA,\"{u}\"\n",
            u = VALID_URL,
        );
        let result = import(&csv);

        assert!(!result.success);
        assert!(result.providers.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0], "Faltan columnas obligatorias: ciudad");
    }

    #[test]
    fn test_import_empty_file() {
        let result = import("");
        assert!(!result.success);
        assert_eq!(result.errors, vec!["El archivo está vacío"]);
    }

    #[test]
    fn test_import_header_only_file() {
        let result = import("nombre_proveedor,ciudad,provincia,url_maps_ubicacion\n");
        assert!(!result.success);
        assert_eq!(result.errors, vec!["El archivo está vacío"]);
    }

    #[test]
    fn test_import_partial_success_cites_row_number() {
        // Header is row 1; the second data row (row 3) lacks the name.
        let csv = format!(
            "nombre_proveedor,ciudad,provincia,url_maps_ubicacion\n\
             Frigorífico Sur,La Plata,Buenos Aires,\"{u}\"\n\
             ,Rosario,Santa Fe,\"{u}\"\n",
            u = VALID_URL,
        );
        let result = import(&csv);

        assert!(result.success);
        assert_eq!(result.providers.len(), 1);
        assert_eq!(result.errors, vec!["Fila 3: nombre_proveedor está vacío"]);
    }

    #[test]
    fn test_import_header_normalization() {
        let csv = format!(
            "Nombre Proveedor,CIUDAD, Provincia ,URL Maps Ubicacion\n\
             Frigorífico Sur,La Plata,Buenos Aires,\"{u}\"\n",
            u = VALID_URL,
        );
        let result = import(&csv);

        assert!(result.success, "errors: {:?}", result.errors);
        assert_eq!(result.providers[0].ciudad, "La Plata");
    }

    #[test]
    fn test_import_alias_fallbacks() {
        let csv = format!(
            "nombre_proveedor,contacto,telefono,ciudad,provincia,url_maps_ubicacion,linea\n\
             Frigorífico Sur,Ana,221-555-0101,La Plata,Buenos Aires,\"{u}\",Carnes\n",
            u = VALID_URL,
        );
        let result = import(&csv);

        assert!(result.success);
        let p = &result.providers[0];
        assert_eq!(p.nombre_contacto, "Ana");
        assert_eq!(p.numero_celular, "221-555-0101");
        assert_eq!(p.categoria, "Carnes");
    }

    #[test]
    fn test_import_category_sentinel() {
        let csv = format!(
            "nombre_proveedor,ciudad,provincia,url_maps_ubicacion\n\
             Frigorífico Sur,La Plata,Buenos Aires,\"{u}\"\n",
            u = VALID_URL,
        );
        let result = import(&csv);

        assert_eq!(result.providers[0].categoria, UNCATEGORIZED);
        assert_eq!(result.categories, vec![UNCATEGORIZED]);
    }

    #[test]
    fn test_import_rejects_unknown_host() {
        let csv = "nombre_proveedor,ciudad,provincia,url_maps_ubicacion\n\
                   Frigorífico Sur,La Plata,Buenos Aires,\"https://example.com/?q=-34.9,-57.9\"\n";
        let result = import(csv);

        assert!(!result.success);
        assert_eq!(
            result.errors,
            vec!["Fila 2: URL de Google Maps no válida para \"Frigorífico Sur\""],
        );
    }

    #[test]
    fn test_import_rejects_unextractable_url() {
        let csv = "nombre_proveedor,ciudad,provincia,url_maps_ubicacion\n\
                   Frigorífico Sur,La Plata,Buenos Aires,https://goo.gl/maps/abc\n";
        let result = import(csv);

        assert!(!result.success);
        assert_eq!(
            result.errors,
            vec!["Fila 2: No se pudieron extraer coordenadas de la URL para \"Frigorífico Sur\""],
        );
    }

    #[test]
    fn test_import_rejects_out_of_range_coordinates() {
        let csv = "nombre_proveedor,ciudad,provincia,url_maps_ubicacion\n\
                   Frigorífico Sur,La Plata,Buenos Aires,\"https://maps.google.com/?q=-134.9,-57.9\"\n";
        let result = import(csv);

        assert!(!result.success);
        assert_eq!(
            result.errors,
            vec!["Fila 2: Coordenadas fuera de rango para \"Frigorífico Sur\""],
        );
    }

    #[test]
    fn test_import_warnings_for_missing_optional_fields() {
        let csv = format!(
            "nombre_proveedor,ciudad,provincia,url_maps_ubicacion\n\
             Frigorífico Sur,La Plata,Buenos Aires,\"{u}\"\n",
            u = VALID_URL,
        );
        let result = import(&csv);

        assert!(result.success);
        assert_eq!(
            result.warnings,
            vec![
                "Algunos proveedores no tienen nombre_contacto",
                "Algunos proveedores no tienen numero_celular",
            ],
        );
    }

    #[test]
    fn test_import_no_warnings_when_optional_fields_present() {
        let csv = format!(
            "nombre_proveedor,nombre_contacto,numero_celular,ciudad,provincia,url_maps_ubicacion\n\
             Frigorífico Sur,Ana,221-555-0101,La Plata,Buenos Aires,\"{u}\"\n",
            u = VALID_URL,
        );
        let result = import(&csv);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_import_values_trimmed() {
        let csv = format!(
            "nombre_proveedor,ciudad,provincia,url_maps_ubicacion\n\
             \"  Frigorífico Sur  \",\" La Plata\",Buenos Aires,\"{u}\"\n",
            u = VALID_URL,
        );
        let result = import(&csv);

        assert_eq!(result.providers[0].nombre_proveedor, "Frigorífico Sur");
        assert_eq!(result.providers[0].ciudad, "La Plata");
    }

    #[test]
    fn test_import_decode_failure_reports_top_level_error() {
        // Invalid UTF-8 in the header row.
        let bytes: &[u8] = &[0xff, 0xfe, 0x41, 0x2c, 0x42];
        let mut ids = SequentialIds::new("p");
        let result = import_providers(bytes, &mut ids);

        assert!(!result.success);
        assert!(result.providers.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("Error al procesar el archivo:"));
    }

    #[test]
    fn test_import_rows_directly() {
        // The collaborator seam: rows that never came from CSV.
        let mut row = SheetRow::new();
        row.insert("nombre_proveedor".into(), "Panadería Norte".into());
        row.insert("ciudad".into(), "Córdoba".into());
        row.insert("provincia".into(), "Córdoba".into());
        row.insert(
            "url_maps_ubicacion".into(),
            "https://www.google.com/maps/@-31.4201,-64.1888,14z".into(),
        );

        let mut ids = SequentialIds::new("p");
        let result = import_rows(&[row], &mut ids);

        assert!(result.success);
        assert_eq!(result.providers[0].lat, -31.4201);
        assert_eq!(result.providers[0].lng, -64.1888);
    }
}
