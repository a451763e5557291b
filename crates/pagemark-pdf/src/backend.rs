//! lopdf-based implementation of the core `PageBackend` trait.
//!
//! Every operation parses the incoming bytes fresh, mutates the parsed
//! document and serializes back out, so callers keep transactional
//! semantics: a failed call never leaves half-applied bytes behind.

use lopdf::{Document, Object, ObjectId};
use pagemark_core::document::{PageBackend, PageInfo, PageOpError};

/// Fallback page size (A4 in points) when no MediaBox can be resolved.
const FALLBACK_PAGE_SIZE: (f64, f64) = (595.0, 842.0);

#[derive(Debug, Default)]
pub struct LopdfBackend;

impl LopdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PageBackend for LopdfBackend {
    fn open(&self, bytes: &[u8]) -> Result<Vec<PageInfo>, PageOpError> {
        let doc = load(bytes)?;
        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(PageOpError::Parse("document has no pages".to_string()));
        }
        let mut infos = Vec::with_capacity(pages.len());
        for (page, page_id) in pages {
            let (width, height) = media_box(&doc, page_id).unwrap_or(FALLBACK_PAGE_SIZE);
            let rotation = rotation(&doc, page_id);
            infos.push(PageInfo {
                page,
                width,
                height,
                rotation,
            });
        }
        Ok(infos)
    }

    fn rotate_page(
        &self,
        bytes: &[u8],
        page: u32,
        by_degrees: i32,
    ) -> Result<Vec<u8>, PageOpError> {
        if by_degrees % 90 != 0 {
            return Err(PageOpError::Backend(format!(
                "rotation must be a multiple of 90, got {by_degrees}"
            )));
        }
        let mut doc = load(bytes)?;
        let page_id = page_object_id(&doc, page)?;
        let current = rotation(&doc, page_id);
        let new = (current + by_degrees).rem_euclid(360);
        let dict = doc
            .get_object_mut(page_id)
            .and_then(|o| o.as_dict_mut())
            .map_err(|e| PageOpError::Backend(format!("page dictionary: {e}")))?;
        dict.set("Rotate", i64::from(new));
        save(doc)
    }

    fn delete_page(&self, bytes: &[u8], page: u32) -> Result<Vec<u8>, PageOpError> {
        let mut doc = load(bytes)?;
        let pages = doc.get_pages();
        if !pages.contains_key(&page) {
            return Err(PageOpError::InvalidPage(page));
        }
        if pages.len() == 1 {
            return Err(PageOpError::LastPage);
        }
        doc.delete_pages(&[page]);
        log::debug!("deleted page {page}");
        save(doc)
    }

    fn extract_page(&self, bytes: &[u8], page: u32) -> Result<Vec<u8>, PageOpError> {
        let mut doc = load(bytes)?;
        let pages = doc.get_pages();
        if !pages.contains_key(&page) {
            return Err(PageOpError::InvalidPage(page));
        }
        let others: Vec<u32> = pages.keys().copied().filter(|p| *p != page).collect();
        doc.delete_pages(&others);
        save(doc)
    }

    fn reorder_pages(&self, bytes: &[u8], order: &[u32]) -> Result<Vec<u8>, PageOpError> {
        let mut doc = load(bytes)?;
        let pages = doc.get_pages();

        // `order` must be a permutation of 1..=page_count.
        if order.len() != pages.len() {
            return Err(PageOpError::InvalidOrder);
        }
        let mut seen = vec![false; pages.len()];
        for &p in order {
            let idx = p
                .checked_sub(1)
                .map(|i| i as usize)
                .filter(|i| *i < pages.len())
                .ok_or(PageOpError::InvalidOrder)?;
            if seen[idx] {
                return Err(PageOpError::InvalidOrder);
            }
            seen[idx] = true;
        }

        let ordered_ids: Vec<ObjectId> = order.iter().map(|p| pages[p]).collect();

        // Copy inherited attributes down before flattening the page tree,
        // otherwise pages lose what they picked up from intermediate nodes.
        for &page_id in &ordered_ids {
            materialize_inherited(&mut doc, page_id)?;
        }

        let root_id = pages_root(&doc)?;
        {
            let root = doc
                .get_object_mut(root_id)
                .and_then(|o| o.as_dict_mut())
                .map_err(|e| PageOpError::Backend(format!("pages root: {e}")))?;
            let kids: Vec<Object> = ordered_ids.iter().map(|id| Object::Reference(*id)).collect();
            root.set("Kids", kids);
            root.set("Count", ordered_ids.len() as i64);
        }
        for &page_id in &ordered_ids {
            let dict = doc
                .get_object_mut(page_id)
                .and_then(|o| o.as_dict_mut())
                .map_err(|e| PageOpError::Backend(format!("page dictionary: {e}")))?;
            dict.set("Parent", root_id);
        }

        save(doc)
    }

    fn merge(&self, bytes: &[u8], other: &[u8]) -> Result<Vec<u8>, PageOpError> {
        let mut primary = load(bytes)?;
        let mut secondary = load(other)?;

        let start_id = primary.max_id + 1;
        secondary.renumber_objects_with(start_id);

        let secondary_page_ids: Vec<ObjectId> = secondary.page_iter().collect();
        let secondary_max_id = secondary.max_id;

        for (id, obj) in secondary.objects.into_iter() {
            primary.objects.insert(id, obj);
        }
        if secondary_max_id > primary.max_id {
            primary.max_id = secondary_max_id;
        }

        let root_id = pages_root(&primary)?;
        {
            let root = primary
                .get_object_mut(root_id)
                .and_then(|o| o.as_dict_mut())
                .map_err(|e| PageOpError::Backend(format!("pages root: {e}")))?;
            let kids = root
                .get_mut(b"Kids")
                .and_then(|o| o.as_array_mut())
                .map_err(|e| PageOpError::Backend(format!("pages kids: {e}")))?;
            for page_id in &secondary_page_ids {
                kids.push(Object::Reference(*page_id));
            }
            let count = root.get(b"Count").and_then(|c| c.as_i64()).unwrap_or(0);
            root.set("Count", count + secondary_page_ids.len() as i64);
        }
        let appended = secondary_page_ids.len();
        for page_id in secondary_page_ids {
            if let Ok(dict) = primary
                .get_object_mut(page_id)
                .and_then(|o| o.as_dict_mut())
            {
                dict.set("Parent", root_id);
            }
        }

        log::debug!("merged {appended} pages");
        save(primary)
    }
}

fn load(bytes: &[u8]) -> Result<Document, PageOpError> {
    Document::load_mem(bytes).map_err(|e| PageOpError::Parse(e.to_string()))
}

fn save(mut doc: Document) -> Result<Vec<u8>, PageOpError> {
    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| PageOpError::Backend(format!("serialize: {e}")))?;
    Ok(out)
}

fn page_object_id(doc: &Document, page: u32) -> Result<ObjectId, PageOpError> {
    doc.get_pages()
        .get(&page)
        .copied()
        .ok_or(PageOpError::InvalidPage(page))
}

fn pages_root(doc: &Document) -> Result<ObjectId, PageOpError> {
    doc.catalog()
        .map_err(|e| PageOpError::Parse(format!("catalog: {e}")))?
        .get(b"Pages")
        .and_then(|o| o.as_reference())
        .map_err(|e| PageOpError::Parse(format!("pages root: {e}")))
}

/// Look up a page attribute, walking the Parent chain for inherited values.
fn inherited(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = Some(page_id);
    while let Some(id) = current {
        let dict = doc.get_object(id).and_then(|o| o.as_dict()).ok()?;
        if let Ok(value) = dict.get(key) {
            let resolved = match value {
                Object::Reference(id) => doc.get_object(*id).ok()?.clone(),
                other => other.clone(),
            };
            return Some(resolved);
        }
        current = dict.get(b"Parent").and_then(|p| p.as_reference()).ok();
    }
    None
}

fn media_box(doc: &Document, page_id: ObjectId) -> Option<(f64, f64)> {
    let arr = match inherited(doc, page_id, b"MediaBox")? {
        Object::Array(arr) => arr,
        _ => return None,
    };
    if arr.len() != 4 {
        return None;
    }
    let llx = as_f64(&arr[0])?;
    let lly = as_f64(&arr[1])?;
    let urx = as_f64(&arr[2])?;
    let ury = as_f64(&arr[3])?;
    Some((urx - llx, ury - lly))
}

fn rotation(doc: &Document, page_id: ObjectId) -> i32 {
    inherited(doc, page_id, b"Rotate")
        .and_then(|o| o.as_i64().ok())
        .map(|r| (r as i32).rem_euclid(360))
        .unwrap_or(0)
}

fn as_f64(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some((*f).into()),
        _ => None,
    }
}

/// Pull inherited attributes into the page's own dictionary.
fn materialize_inherited(doc: &mut Document, page_id: ObjectId) -> Result<(), PageOpError> {
    const KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"Rotate", b"CropBox"];
    for key in KEYS {
        let already = doc
            .get_object(page_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| PageOpError::Backend(format!("page dictionary: {e}")))?
            .has(key);
        if already {
            continue;
        }
        if let Some(value) = inherited(doc, page_id, key) {
            let dict = doc
                .get_object_mut(page_id)
                .and_then(|o| o.as_dict_mut())
                .map_err(|e| PageOpError::Backend(format!("page dictionary: {e}")))?;
            dict.set(key.to_vec(), value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    /// Build a document whose page `i` (1-based) has MediaBox width
    /// `600 + i`, so pages stay distinguishable across operations.
    fn sample_pdf(n: u32) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids: Vec<Object> = Vec::new();
        for i in 1..=n {
            let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    Object::Integer(600 + i as i64),
                    792.into(),
                ],
            });
            kids.push(Object::Reference(page_id));
        }
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Rotate" => 0,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    fn widths(backend: &LopdfBackend, bytes: &[u8]) -> Vec<f64> {
        backend
            .open(bytes)
            .unwrap()
            .into_iter()
            .map(|p| p.width)
            .collect()
    }

    #[test]
    fn test_open_reads_page_info() {
        let backend = LopdfBackend::new();
        let infos = backend.open(&sample_pdf(3)).unwrap();
        assert_eq!(infos.len(), 3);
        assert_eq!(infos[0].page, 1);
        assert_eq!(infos[0].width, 601.0);
        assert_eq!(infos[0].height, 792.0);
        assert_eq!(infos[0].rotation, 0);
    }

    #[test]
    fn test_open_rejects_garbage() {
        let backend = LopdfBackend::new();
        assert!(matches!(
            backend.open(b"not a pdf"),
            Err(PageOpError::Parse(_))
        ));
    }

    #[test]
    fn test_rotate_page() {
        let backend = LopdfBackend::new();
        let bytes = backend.rotate_page(&sample_pdf(2), 1, 90).unwrap();
        let infos = backend.open(&bytes).unwrap();
        assert_eq!(infos[0].rotation, 90);
        assert_eq!(infos[1].rotation, 0);
    }

    #[test]
    fn test_rotate_accumulates_and_wraps() {
        let backend = LopdfBackend::new();
        let bytes = backend.rotate_page(&sample_pdf(1), 1, 270).unwrap();
        let bytes = backend.rotate_page(&bytes, 1, 180).unwrap();
        let infos = backend.open(&bytes).unwrap();
        assert_eq!(infos[0].rotation, 90);
    }

    #[test]
    fn test_rotate_rejects_odd_angles() {
        let backend = LopdfBackend::new();
        assert!(backend.rotate_page(&sample_pdf(1), 1, 45).is_err());
    }

    #[test]
    fn test_delete_page() {
        let backend = LopdfBackend::new();
        let bytes = backend.delete_page(&sample_pdf(3), 2).unwrap();
        assert_eq!(widths(&backend, &bytes), vec![601.0, 603.0]);
    }

    #[test]
    fn test_delete_refuses_last_page() {
        let backend = LopdfBackend::new();
        assert!(matches!(
            backend.delete_page(&sample_pdf(1), 1),
            Err(PageOpError::LastPage)
        ));
    }

    #[test]
    fn test_delete_invalid_page() {
        let backend = LopdfBackend::new();
        assert!(matches!(
            backend.delete_page(&sample_pdf(2), 5),
            Err(PageOpError::InvalidPage(5))
        ));
    }

    #[test]
    fn test_extract_page() {
        let backend = LopdfBackend::new();
        let bytes = backend.extract_page(&sample_pdf(3), 2).unwrap();
        assert_eq!(widths(&backend, &bytes), vec![602.0]);
    }

    #[test]
    fn test_reorder_pages() {
        let backend = LopdfBackend::new();
        let bytes = backend.reorder_pages(&sample_pdf(3), &[3, 1, 2]).unwrap();
        assert_eq!(widths(&backend, &bytes), vec![603.0, 601.0, 602.0]);
    }

    #[test]
    fn test_reorder_rejects_bad_permutations() {
        let backend = LopdfBackend::new();
        let bytes = sample_pdf(3);
        assert!(matches!(
            backend.reorder_pages(&bytes, &[1, 2]),
            Err(PageOpError::InvalidOrder)
        ));
        assert!(matches!(
            backend.reorder_pages(&bytes, &[1, 1, 2]),
            Err(PageOpError::InvalidOrder)
        ));
        assert!(matches!(
            backend.reorder_pages(&bytes, &[1, 2, 4]),
            Err(PageOpError::InvalidOrder)
        ));
    }

    #[test]
    fn test_merge_appends_pages() {
        let backend = LopdfBackend::new();
        let bytes = backend.merge(&sample_pdf(2), &sample_pdf(1)).unwrap();
        assert_eq!(widths(&backend, &bytes), vec![601.0, 602.0, 601.0]);
    }

    #[test]
    fn test_inherited_rotation_resolved() {
        // Rotate lives on the pages root in the sample, not on each page.
        let backend = LopdfBackend::new();
        let infos = backend.open(&sample_pdf(1)).unwrap();
        assert_eq!(infos[0].rotation, 0);
    }
}
